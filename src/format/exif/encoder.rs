//! Builder trees to bytes.
//!
//! Each directory in a sibling chain is encoded twice:
//!
//! 1. A dry run with no child offsets, to learn the table size and the size
//!    of the data area holding values longer than four bytes.
//! 2. A real run that knows where the data area ends, so child directories
//!    can be placed right after it and the next-sibling link can point past
//!    them.
//!
//! The resulting layout of one directory block:
//!
//! ```text
//! +-------+------------------+------+-----------+--------------+
//! | count | N x 12-byte tags | next | data area | child blocks |
//! +-------+------------------+------+-----------+--------------+
//! ```
//!
//! The two runs must agree on every size; a disagreement is reported as
//! [`BuildError::SizeMismatch`] and means the encoder itself is wrong.

use bytes::{BufMut, BytesMut};
use tracing::trace;

use super::builder::{Builder, BuilderTag, BuilderValue};
use super::header::{ExifHeader, DEFAULT_FIRST_IFD_OFFSET};
use super::scanner::ENTRY_SIZE;
use super::types::TagType;
use crate::error::BuildError;

/// Size of a directory table holding `entry_count` entries.
pub fn table_size(entry_count: usize) -> u64 {
    2 + (ENTRY_SIZE * entry_count) as u64 + 4
}

fn to_offset(value: u64) -> Result<u32, BuildError> {
    u32::try_from(value).map_err(|_| BuildError::OffsetOverflow(value))
}

// =============================================================================
// Journal
// =============================================================================

/// Nesting marker of a journal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalDirection {
    Enter,
    Leave,
    Note,
}

impl JournalDirection {
    fn symbol(self) -> char {
        match self {
            JournalDirection::Enter => '>',
            JournalDirection::Leave => '<',
            JournalDirection::Note => '-',
        }
    }
}

/// One recorded encoding step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEvent {
    pub direction: JournalDirection,
    pub location: &'static str,
    pub message: String,
}

// =============================================================================
// Allocator
// =============================================================================

/// Data area for values that do not fit in the table.
struct Allocator {
    next_offset: u64,
    data: BytesMut,
}

impl Allocator {
    fn new(addressable_offset: u64) -> Self {
        Self {
            next_offset: addressable_offset,
            data: BytesMut::new(),
        }
    }

    fn allocate(&mut self, value: &[u8]) -> Result<u32, BuildError> {
        let offset = to_offset(self.next_offset)?;
        self.data.put_slice(value);
        self.next_offset += value.len() as u64;
        Ok(offset)
    }
}

/// One encoded directory with the sizes of its parts.
struct EncodedDirectory {
    data: BytesMut,
    table_size: u64,
    data_size: u64,
    child_sizes: Vec<u64>,
}

// =============================================================================
// Encoder
// =============================================================================

/// Two-pass directory encoder.
#[derive(Debug, Default)]
pub struct Encoder {
    journal: Vec<JournalEvent>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every step recorded so far.
    pub fn journal(&self) -> &[JournalEvent] {
        &self.journal
    }

    /// The journal as indented text, one numbered line per event.
    pub fn format_journal(&self) -> Vec<String> {
        let mut level = 0usize;
        self.journal
            .iter()
            .enumerate()
            .map(|(i, event)| {
                if event.direction == JournalDirection::Leave {
                    level = level.saturating_sub(1);
                }
                let line = format!(
                    "{i:3} {}{} {}: {}",
                    "  ".repeat(level),
                    event.direction.symbol(),
                    event.location,
                    event.message
                );
                if event.direction == JournalDirection::Enter {
                    level += 1;
                }
                line
            })
            .collect()
    }

    fn push(&mut self, location: &'static str, direction: JournalDirection, message: String) {
        trace!(location, direction = %direction.symbol(), "{message}");
        self.journal.push(JournalEvent {
            direction,
            location,
            message,
        });
    }

    /// Write one table entry. Returns the encoded child block when the tag
    /// points at a nested builder and `next_offset_to_write` is known.
    fn encode_tag(
        &mut self,
        builder: &Builder,
        tag: &BuilderTag,
        table: &mut BytesMut,
        allocator: &mut Allocator,
        next_offset_to_write: u32,
    ) -> Result<Option<BytesMut>, BuildError> {
        let order = builder.byte_order;
        order.put_u16(table, tag.tag_id());
        order.put_u16(table, tag.tag_type().code());

        match tag.value() {
            BuilderValue::Bytes(value) => {
                let unit_size = match tag.tag_type() {
                    TagType::Undefined => 1,
                    other => other.size(),
                };
                if value.len() % unit_size != 0 {
                    return Err(BuildError::Unaligned {
                        tag_id: tag.tag_id(),
                        len: value.len(),
                        type_size: unit_size,
                    });
                }
                let unit_count = to_offset((value.len() / unit_size) as u64)?;
                order.put_u32(table, unit_count);

                if value.len() > 4 {
                    let offset = allocator.allocate(value)?;
                    order.put_u32(table, offset);
                } else {
                    let mut field = [0u8; 4];
                    field[..value.len()].copy_from_slice(value);
                    table.put_slice(&field);
                }
                Ok(None)
            }
            BuilderValue::Thumbnail(data) => {
                // One LONG holding the offset of the data, whatever its length
                order.put_u32(table, 1);
                let offset = allocator.allocate(data)?;
                order.put_u32(table, offset);
                Ok(None)
            }
            BuilderValue::Child(child) => {
                order.put_u32(table, 1);
                if next_offset_to_write == 0 {
                    self.push(
                        "encode_tag",
                        JournalDirection::Note,
                        format!("Not descending to child: [{}]", child.identity.unindexed_path()),
                    );
                    order.put_u32(table, 0);
                    return Ok(None);
                }

                self.push(
                    "encode_tag",
                    JournalDirection::Enter,
                    format!(
                        "[{}]->[{}]",
                        builder.identity.unindexed_path(),
                        child.identity.unindexed_path()
                    ),
                );
                let block = self.encode_and_attach(child, next_offset_to_write as u64)?;
                self.push(
                    "encode_tag",
                    JournalDirection::Leave,
                    format!(
                        "[{}]->[{}]",
                        child.identity.unindexed_path(),
                        builder.identity.unindexed_path()
                    ),
                );
                order.put_u32(table, next_offset_to_write);
                Ok(Some(block))
            }
        }
    }

    /// Encode one directory: table, data area, then child blocks.
    ///
    /// With `next_offset_to_write == 0` (dry run) children are not encoded
    /// and their pointers are written as 0.
    fn encode_directory(
        &mut self,
        builder: &Builder,
        addressable_offset: u64,
        mut next_offset_to_write: u32,
        link_next: bool,
    ) -> Result<EncodedDirectory, BuildError> {
        self.push("encode_directory", JournalDirection::Enter, builder.to_string());

        let count = u16::try_from(builder.tags.len()).map_err(|_| BuildError::TooManyTags {
            path: builder.identity.to_string(),
            count: builder.tags.len(),
        })?;
        let table_size = table_size(builder.tags.len());

        let mut table = BytesMut::with_capacity(table_size as usize);
        builder.byte_order.put_u16(&mut table, count);

        let mut allocator = Allocator::new(addressable_offset);
        let mut child_blocks = Vec::new();
        for tag in &builder.tags {
            let block = self.encode_tag(builder, tag, &mut table, &mut allocator, next_offset_to_write)?;
            if let Some(block) = block {
                next_offset_to_write = to_offset(next_offset_to_write as u64 + block.len() as u64)?;
                child_blocks.push(block);
            }
        }

        if link_next {
            self.push(
                "encode_directory",
                JournalDirection::Note,
                format!("Setting next directory to (0x{next_offset_to_write:08x})"),
            );
            builder.byte_order.put_u32(&mut table, next_offset_to_write);
        } else {
            builder.byte_order.put_u32(&mut table, 0);
        }

        let data_size = allocator.data.len() as u64;
        let child_sizes: Vec<u64> = child_blocks.iter().map(|b| b.len() as u64).collect();

        table.unsplit(allocator.data);
        for block in child_blocks {
            table.unsplit(block);
        }

        self.push("encode_directory", JournalDirection::Leave, builder.to_string());
        Ok(EncodedDirectory {
            data: table,
            table_size,
            data_size,
            child_sizes,
        })
    }

    /// Encode a builder and its sibling chain as if the first table starts at
    /// `addressable_offset`.
    fn encode_and_attach(&mut self, first: &Builder, addressable_offset: u64) -> Result<BytesMut, BuildError> {
        self.push("encode_and_attach", JournalDirection::Enter, first.to_string());

        let mut out = BytesMut::new();
        let mut offset = addressable_offset;
        let mut current = Some(first);
        let mut index = 0;
        while let Some(builder) = current {
            let path = builder.identity.unindexed_path();

            self.push(
                "encode_and_attach",
                JournalDirection::Note,
                format!("Calculating size: ({index}) [{path}]"),
            );
            let dry = self.encode_directory(builder, offset, 0, false)?;

            offset += dry.table_size;
            let next_offset_to_write = to_offset(offset + dry.data_size)?;
            self.push(
                "encode_and_attach",
                JournalDirection::Note,
                format!("Encoding ({index}) [{path}] with children at (0x{next_offset_to_write:08x})"),
            );
            let real = self.encode_directory(builder, offset, next_offset_to_write, builder.next.is_some())?;

            if real.table_size != dry.table_size {
                return Err(BuildError::SizeMismatch {
                    what: "table",
                    expected: dry.table_size as usize,
                    actual: real.table_size as usize,
                });
            }
            if real.data_size != dry.data_size {
                return Err(BuildError::SizeMismatch {
                    what: "data area",
                    expected: dry.data_size as usize,
                    actual: real.data_size as usize,
                });
            }
            let children_size: u64 = real.child_sizes.iter().sum();
            let expected = real.table_size + real.data_size + children_size;
            if real.data.len() as u64 != expected {
                return Err(BuildError::SizeMismatch {
                    what: "directory block",
                    expected: expected as usize,
                    actual: real.data.len(),
                });
            }

            out.unsplit(real.data);
            offset += real.data_size + children_size;
            current = builder.next.as_deref();
            index += 1;
        }

        self.push("encode_and_attach", JournalDirection::Leave, first.to_string());
        Ok(out)
    }

    /// Directory blocks for `builder` and its chain, addressed as if preceded
    /// by the standard 8-byte header.
    pub fn encode_to_payload(&mut self, builder: &Builder) -> Result<Vec<u8>, BuildError> {
        Ok(self
            .encode_and_attach(builder, DEFAULT_FIRST_IFD_OFFSET as u64)?
            .to_vec())
    }

    /// A complete blob: header for the builder's byte order, then the payload.
    pub fn encode_to_blob(&mut self, builder: &Builder) -> Result<Vec<u8>, BuildError> {
        let payload = self.encode_and_attach(builder, DEFAULT_FIRST_IFD_OFFSET as u64)?;
        let mut blob = Vec::with_capacity(payload.len() + 8);
        blob.extend_from_slice(&ExifHeader::build(builder.byte_order, DEFAULT_FIRST_IFD_OFFSET));
        blob.extend_from_slice(&payload);
        Ok(blob)
    }
}

/// Encode `builder` and its chain into a complete blob.
pub fn encode_to_blob(builder: &Builder) -> Result<Vec<u8>, BuildError> {
    Encoder::new().encode_to_blob(builder)
}
