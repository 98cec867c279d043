//! Decoded directory entries.
//!
//! An [`Entry`] records where a tag's value lives, not the value itself.
//! Values are read from the blob on demand:
//!
//! ```text
//! Bytes 0-1:  Tag id
//! Bytes 2-3:  Type code
//! Bytes 4-7:  Unit count
//! Bytes 8-11: Value (when count * unit size <= 4) or offset to it
//! ```

use std::fmt;

use bytes::Bytes;

use super::header::ByteOrder;
use super::kinds::DirectoryIdentity;
use super::types::{format_value, parse_value, TagType, TagValue};
use super::undefined::{UndefinedValue, UserCommentEncoding};
use crate::error::{ExifError, IoError};
use crate::io::SharedSource;

/// JPEGInterchangeFormat: offset of the thumbnail in IFD1
pub const TAG_THUMBNAIL_OFFSET: u16 = 0x0201;

/// JPEGInterchangeFormatLength: size of the thumbnail in IFD1
pub const TAG_THUMBNAIL_SIZE: u16 = 0x0202;

/// Shown for UNDEFINED values with no decoder
pub const UNKNOWN_PLACEHOLDER: &str = "!UNKNOWN";

/// Shown for values whose bytes could not be decoded
pub const MALFORMED_PLACEHOLDER: &str = "!MALFORMED";

/// One tag record of a decoded directory.
#[derive(Clone)]
pub struct Entry {
    pub(crate) identity: DirectoryIdentity,
    pub(crate) tag_id: u16,
    pub(crate) tag_name: String,
    pub(crate) tag_type: TagType,
    pub(crate) unit_count: u32,
    pub(crate) value_field: [u8; 4],
    pub(crate) byte_order: ByteOrder,
    pub(crate) position: usize,
    pub(crate) child: Option<DirectoryIdentity>,
    pub(crate) source: SharedSource,
}

impl Entry {
    /// Directory holding this entry.
    pub fn identity(&self) -> &DirectoryIdentity {
        &self.identity
    }

    pub fn tag_id(&self) -> u16 {
        self.tag_id
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn tag_type(&self) -> TagType {
        self.tag_type
    }

    pub fn unit_count(&self) -> u32 {
        self.unit_count
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Index of the record in the directory table.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The raw 4-byte value/offset field.
    pub fn value_field(&self) -> [u8; 4] {
        self.value_field
    }

    /// The value/offset field read as an offset.
    pub fn value_offset(&self) -> u32 {
        self.byte_order.read_u32(&self.value_field)
    }

    /// Identity of the child directory this entry points at, if it is a pointer.
    pub fn child_identity(&self) -> Option<&DirectoryIdentity> {
        self.child.as_ref()
    }

    pub fn is_child_pointer(&self) -> bool {
        self.child.is_some()
    }

    pub fn is_thumbnail_offset(&self) -> bool {
        self.tag_id == TAG_THUMBNAIL_OFFSET && self.identity.is_thumbnail()
    }

    pub fn is_thumbnail_size(&self) -> bool {
        self.tag_id == TAG_THUMBNAIL_SIZE && self.identity.is_thumbnail()
    }

    /// Total value size in bytes.
    pub fn size_in_bytes(&self) -> u64 {
        self.unit_count as u64 * self.tag_type.size() as u64
    }

    pub fn is_inline(&self) -> bool {
        self.tag_type.fits_inline(self.unit_count)
    }

    /// Offset of the value when it is not stored inline.
    pub fn far_offset(&self) -> Option<u32> {
        (!self.is_inline()).then(|| self.value_offset())
    }

    /// The encoded value bytes exactly as stored.
    ///
    /// # Errors
    /// - `OffsetInvalid` if the value lies outside the blob
    pub fn raw_encoded(&self) -> Result<Bytes, ExifError> {
        let size = self.size_in_bytes();
        if self.is_inline() {
            return Ok(Bytes::copy_from_slice(&self.value_field[..size as usize]));
        }

        let offset = self.value_offset() as u64;
        let len = usize::try_from(size).map_err(|_| ExifError::OffsetInvalid {
            offset,
            size: self.source.size(),
        })?;
        self.source
            .read_exact_at(offset, len)
            .map_err(|err| match err {
                IoError::RangeOutOfBounds { size, .. } => ExifError::OffsetInvalid { offset, size },
                other => ExifError::Io(other),
            })
    }

    /// Decode the value.
    ///
    /// UNDEFINED values go through the tag-specific decoders.
    pub fn value(&self) -> Result<TagValue, ExifError> {
        let raw = self.raw_encoded()?;
        match self.tag_type {
            TagType::Undefined => {
                UndefinedValue::decode(self.identity.kind(), self.tag_id, &raw).map(TagValue::Undefined)
            }
            other => parse_value(other, &raw, self.unit_count, self.byte_order),
        }
    }

    /// The value bytes, as they would be written back out.
    ///
    /// UNDEFINED values with a decoder are decoded and re-encoded; those
    /// without one, and UserComments whose prefix was not recognised, are
    /// returned verbatim.
    pub fn raw_bytes(&self) -> Result<Vec<u8>, ExifError> {
        if self.tag_type != TagType::Undefined {
            return Ok(self.raw_encoded()?.to_vec());
        }

        match self.value() {
            Ok(TagValue::Undefined(UndefinedValue::UserComment {
                encoding: UserCommentEncoding::Undefined,
                ..
            })) => Ok(self.raw_encoded()?.to_vec()),
            Ok(TagValue::Undefined(value)) => Ok(value.encode()?.bytes),
            Ok(other) => Ok(other.encode(self.byte_order)?.bytes),
            Err(ExifError::UnhandledUndefinedTag { .. }) => Ok(self.raw_encoded()?.to_vec()),
            Err(err) => Err(err),
        }
    }

    fn format_with(&self, just_first: bool) -> Result<String, ExifError> {
        match self.value() {
            Ok(value) => Ok(format_value(&value, just_first)),
            Err(ExifError::UnhandledUndefinedTag { .. }) => Ok(UNKNOWN_PLACEHOLDER.to_string()),
            Err(ExifError::ValueUnparseable(_)) => Ok(MALFORMED_PLACEHOLDER.to_string()),
            Err(err) => Err(err),
        }
    }

    /// Display text for the whole value, or a placeholder when it cannot be decoded.
    pub fn format(&self) -> Result<String, ExifError> {
        self.format_with(false)
    }

    /// Display text for the first unit only.
    pub fn format_first(&self) -> Result<String, ExifError> {
        self.format_with(true)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("identity", &self.identity.to_string())
            .field("tag_id", &format_args!("0x{:04x}", self.tag_id))
            .field("tag_name", &self.tag_name)
            .field("tag_type", &self.tag_type)
            .field("unit_count", &self.unit_count)
            .field("value_field", &self.value_field)
            .field("child", &self.child.as_ref().map(ToString::to_string))
            .finish()
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entry<PATH=[{}] ID=(0x{:04x}) NAME=[{}] TYPE=[{}] COUNT=({})",
            self.identity, self.tag_id, self.tag_name, self.tag_type, self.unit_count
        )?;
        if let Some(child) = &self.child {
            write!(f, " CHILD=[{child}]")?;
        }
        f.write_str(">")
    }
}
