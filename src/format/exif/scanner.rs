//! Directory scanning.
//!
//! Two traversals are offered over the same parser:
//!
//! - [`Scanner::scan`] walks a sibling chain depth-first, descending into
//!   child directories as their pointer tags are met, and hands every kept
//!   entry to a visitor. Nothing is retained.
//! - [`Scanner::collect`] builds a [`DirectoryIndex`] breadth-first from an
//!   explicit work queue, so adversarial nesting costs heap rather than stack.
//!
//! Both share one visited-offset set: a next-directory link that points at a
//! directory already parsed ends the chain.
//!
//! # Per-tag failures
//!
//! Unknown type codes, unregistered tag ids and unsupported types skip the
//! tag with a warning. Structural failures (an unreadable table, an offset
//! outside the blob) abort the scan.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error, warn};

use super::directory::{Directory, DirectoryIndex};
use super::entry::Entry;
use super::header::{ByteOrder, ExifHeader};
use super::kinds::DirectoryIdentity;
use super::registry::{TagDefinition, TagRegistry};
use super::types::TagType;
use crate::error::{ExifError, IoError};
use crate::io::{MemorySource, SharedSource, SourceCursor};

/// Size of one directory entry on the wire
pub const ENTRY_SIZE: usize = 12;

/// Callback invoked for every kept entry during [`Scanner::scan`].
pub type EntryVisitor<'v> = dyn FnMut(&Entry) -> Result<(), ExifError> + 'v;

// =============================================================================
// Options and reports
// =============================================================================

/// Parser behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Accept tags found in the wrong directory kind when another kind
    /// registers the same id, and accept any valid type code for known tags.
    ///
    /// This is a best-effort recovery mode for blobs written by broken
    /// encoders. A tag id can mean something else in another kind, so values
    /// recovered this way may be garbage.
    pub universal_search: bool,
}

/// A tag that was not registered for the directory it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownTag {
    /// Fully-qualified path of the directory holding the tag
    pub path: String,
    pub tag_id: u16,
    /// Unindexed path of the kind the tag was matched to instead, if any
    pub matched_path: Option<String>,
}

/// Outcome of a visiting scan.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub header: ExifHeader,
    /// End of the furthest structure touched (tables, far values, thumbnail);
    /// UNDEFINED far values are not counted
    pub furthest_offset: u64,
    pub unknown_tags: Vec<UnknownTag>,
}

/// A directory table parsed from the blob.
#[derive(Debug)]
pub(crate) struct ParsedDirectory {
    pub entries: Vec<Entry>,
    pub next_offset: u32,
    pub thumbnail: Option<Bytes>,
}

fn io_to_exif(err: IoError) -> ExifError {
    match err {
        IoError::RangeOutOfBounds { offset, size, .. } => ExifError::OffsetInvalid { offset, size },
        other => ExifError::Io(other),
    }
}

// =============================================================================
// Scanner
// =============================================================================

/// Stateful directory parser over one blob.
pub struct Scanner {
    source: SharedSource,
    byte_order: ByteOrder,
    registry: Arc<TagRegistry>,
    options: ScanOptions,
    visited: HashSet<u32>,
    furthest_offset: u64,
    unknown_tags: Vec<UnknownTag>,
}

impl Scanner {
    pub fn new(
        source: SharedSource,
        byte_order: ByteOrder,
        registry: Arc<TagRegistry>,
        options: ScanOptions,
    ) -> Self {
        Self {
            source,
            byte_order,
            registry,
            options,
            visited: HashSet::new(),
            furthest_offset: 0,
            unknown_tags: Vec::new(),
        }
    }

    pub fn furthest_offset(&self) -> u64 {
        self.furthest_offset
    }

    pub fn unknown_tags(&self) -> &[UnknownTag] {
        &self.unknown_tags
    }

    fn bump_furthest(&mut self, candidate: u64) {
        if candidate > self.furthest_offset {
            self.furthest_offset = candidate;
        }
    }

    fn cursor_at(&self, offset: u32) -> Result<SourceCursor, ExifError> {
        SourceCursor::new(Arc::clone(&self.source), 0)
            .fork_at(offset as u64)
            .map_err(io_to_exif)
    }

    fn read_u16(&self, cursor: &mut SourceCursor) -> Result<u16, ExifError> {
        let raw = cursor.read_array::<2>().map_err(io_to_exif)?;
        Ok(self.byte_order.read_u16(&raw))
    }

    fn read_u32(&self, cursor: &mut SourceCursor) -> Result<u32, ExifError> {
        let raw = cursor.read_array::<4>().map_err(io_to_exif)?;
        Ok(self.byte_order.read_u32(&raw))
    }

    /// Resolve the definition for a tag, falling back to other kinds under
    /// universal search.
    fn lookup_definition(
        &mut self,
        identity: &DirectoryIdentity,
        tag_id: u16,
        tag_type: TagType,
    ) -> Result<TagDefinition, ExifError> {
        let kind = identity.kind();
        if let Ok(definition) = self.registry.get(kind, tag_id) {
            return Ok(definition.clone());
        }

        if !self.options.universal_search {
            warn!(
                path = %identity,
                tag_id = format_args!("0x{tag_id:04x}"),
                "Tag is not known and will be skipped"
            );
            return Err(ExifError::TagNotFound {
                kind: kind.name(),
                tag_id,
            });
        }

        debug!(
            path = %identity,
            tag_id = format_args!("0x{tag_id:04x}"),
            "Tag not valid for directory, attempting secondary lookup"
        );
        let found = self
            .registry
            .find_first(tag_id, tag_type, None)
            .or_else(|_| self.registry.search_all_kinds(kind, tag_id))
            .ok()
            .cloned();

        self.unknown_tags.push(UnknownTag {
            path: identity.to_string(),
            tag_id,
            matched_path: found.as_ref().map(|d| d.kind.path()),
        });

        match found {
            Some(definition) => {
                warn!(
                    path = %identity,
                    tag_id = format_args!("0x{tag_id:04x}"),
                    name = %definition.name,
                    matched = %definition.kind.path(),
                    "Tag belongs to another directory; using that definition"
                );
                Ok(definition)
            }
            None => {
                warn!(
                    path = %identity,
                    tag_id = format_args!("0x{tag_id:04x}"),
                    "Tag is not recognised and will be skipped"
                );
                Err(ExifError::TagNotFound {
                    kind: kind.name(),
                    tag_id,
                })
            }
        }
    }

    /// Parse one 12-byte entry at the cursor.
    ///
    /// The cursor always advances past the record, even when the tag is
    /// rejected.
    ///
    /// # Errors
    /// - `TagTypeNotValid` for unknown type codes
    /// - `TagNotFound` for unregistered ids
    /// - `TagTypeNotSupported` when the type is not allowed for the tag
    /// - `OffsetInvalid` if the record cannot be read
    pub fn parse_tag(
        &mut self,
        identity: &DirectoryIdentity,
        position: usize,
        cursor: &mut SourceCursor,
    ) -> Result<Entry, ExifError> {
        let tag_id = self.read_u16(cursor)?;
        let type_code = self.read_u16(cursor)?;
        let unit_count = self.read_u32(cursor)?;
        let value_field = cursor.read_array::<4>().map_err(io_to_exif)?;

        let Some(tag_type) = TagType::from_u16(type_code) else {
            warn!(
                path = %identity,
                tag_id = format_args!("0x{tag_id:04x}"),
                position,
                type_code,
                "Tag has an invalid type and will be skipped"
            );
            return Err(ExifError::TagTypeNotValid { tag_id, type_code });
        };

        let definition = self.lookup_definition(identity, tag_id, tag_type)?;

        if !self.options.universal_search && !definition.does_support_type(tag_type) {
            warn!(
                path = %identity,
                tag_id = format_args!("0x{tag_id:04x}"),
                position,
                tag_type = %tag_type,
                "Tag has an unsupported type and will be skipped"
            );
            return Err(ExifError::TagTypeNotSupported {
                kind: identity.kind().name(),
                tag_id,
                tag_type: tag_type.name(),
            });
        }

        Ok(Entry {
            identity: identity.clone(),
            tag_id,
            tag_name: definition.name,
            tag_type,
            unit_count,
            value_field,
            byte_order: self.byte_order,
            position,
            child: identity.child_for_tag(tag_id),
            source: Arc::clone(&self.source),
        })
    }

    /// Read the thumbnail described by the IFD1 offset/size pair.
    fn parse_thumbnail(&self, offset_entry: &Entry, size_entry: &Entry) -> Result<Bytes, ExifError> {
        let size = size_entry
            .value()?
            .as_longs()
            .and_then(|v| match v {
                [only] => Some(*only),
                _ => None,
            })
            .ok_or_else(|| {
                ExifError::ValueUnparseable("thumbnail size is not exactly one LONG".to_string())
            })?;

        self.source
            .read_exact_at(offset_entry.value_offset() as u64, size as usize)
            .map_err(io_to_exif)
    }

    /// Parse the directory table at the cursor.
    ///
    /// With `descend`, child directories are scanned as soon as their pointer
    /// tags are met.
    pub(crate) fn parse_directory(
        &mut self,
        identity: &DirectoryIdentity,
        cursor: &mut SourceCursor,
        visitor: &mut EntryVisitor<'_>,
        descend: bool,
    ) -> Result<ParsedDirectory, ExifError> {
        let tag_count = self.read_u16(cursor)?;
        debug!(path = %identity, tag_count, "Parsing directory");

        let mut entries = Vec::with_capacity(tag_count as usize);
        let mut thumbnail_offset: Option<Entry> = None;
        let mut thumbnail_size: Option<Entry> = None;

        for position in 0..tag_count as usize {
            let entry = match self.parse_tag(identity, position, cursor) {
                Ok(entry) => entry,
                Err(err) if err.is_tag_local() => continue,
                Err(err) => return Err(err),
            };

            visitor(&entry)?;

            if entry.is_thumbnail_offset() {
                thumbnail_offset = Some(entry.clone());
                entries.push(entry);
                continue;
            }
            if entry.is_thumbnail_size() {
                thumbnail_size = Some(entry.clone());
                entries.push(entry);
                continue;
            }

            if entry.tag_type() != TagType::Undefined {
                if let Some(far) = entry.far_offset() {
                    self.bump_furthest(far as u64 + entry.size_in_bytes());
                }
            }

            if descend {
                if let Some(child) = entry.child_identity() {
                    debug!(from = %identity, to = %child, "Descending into child directory");
                    self.scan(child, entry.value_offset(), visitor)?;
                }
            }

            entries.push(entry);
        }

        let mut thumbnail = None;
        if let (Some(offset_entry), Some(size_entry)) = (&thumbnail_offset, &thumbnail_size) {
            match self.parse_thumbnail(offset_entry, size_entry) {
                Ok(data) => {
                    let offset = offset_entry.value_offset() as u64;
                    debug!(path = %identity, offset, len = data.len(), "Found thumbnail");
                    self.bump_furthest(offset + data.len() as u64);
                    thumbnail = Some(data);
                }
                Err(err) => {
                    error!(path = %identity, error = %err, "Thumbnail could not be read");
                }
            }
        }

        let mut next_offset = self.read_u32(cursor)?;
        if next_offset != 0 && !self.visited.insert(next_offset) {
            warn!(
                path = %identity,
                next_offset,
                "Directory linked to more than once; possible cycle, not reparsing"
            );
            next_offset = 0;
        }
        if next_offset == 0 {
            debug!(path = %identity, "Directory chain has terminated");
        }

        Ok(ParsedDirectory {
            entries,
            next_offset,
            thumbnail,
        })
    }

    /// Walk the sibling chain starting at `offset`, visiting every kept entry.
    ///
    /// `identity` gives the kind and lineage; siblings are numbered from 0.
    /// An unreachable directory ends the chain with an error log.
    pub fn scan(
        &mut self,
        identity: &DirectoryIdentity,
        offset: u32,
        visitor: &mut EntryVisitor<'_>,
    ) -> Result<(), ExifError> {
        let mut offset = offset;
        for index in 0u32.. {
            let sibling = identity.with_index(index);
            debug!(path = %sibling, offset, "Parsing directory (scan)");

            let mut cursor = match self.cursor_at(offset) {
                Ok(cursor) => cursor,
                Err(ExifError::OffsetInvalid { .. }) => {
                    error!(path = %sibling, offset, "Directory is unreachable; terminating scan");
                    break;
                }
                Err(err) => return Err(err),
            };
            self.visited.insert(offset);

            let parsed = self.parse_directory(&sibling, &mut cursor, visitor, true)?;
            self.bump_furthest(cursor.position());

            if parsed.next_offset == 0 {
                break;
            }
            offset = parsed.next_offset;
        }
        Ok(())
    }

    /// Build the full directory index starting from IFD0 at `root_offset`.
    ///
    /// # Errors
    /// - `OffsetInvalid` if any queued directory lies outside the blob
    pub fn collect(&mut self, root_offset: u32) -> Result<DirectoryIndex, ExifError> {
        struct Queued {
            identity: DirectoryIdentity,
            offset: u32,
            parent: Option<usize>,
            parent_tag_index: Option<usize>,
        }

        let mut queue = VecDeque::from([Queued {
            identity: DirectoryIdentity::root(),
            offset: root_offset,
            parent: None,
            parent_tag_index: None,
        }]);
        let mut directories: Vec<Directory> = Vec::new();
        let mut edges: HashMap<u32, usize> = HashMap::new();
        let mut ignore = |_: &Entry| -> Result<(), ExifError> { Ok(()) };

        while let Some(queued) = queue.pop_front() {
            debug!(path = %queued.identity, offset = queued.offset, "Parsing directory (collect)");

            let mut cursor = self.cursor_at(queued.offset)?;
            self.visited.insert(queued.offset);
            let parsed = self.parse_directory(&queued.identity, &mut cursor, &mut ignore, false)?;
            self.bump_furthest(cursor.position());

            let id = directories.len();
            let mut entries_by_tag_id: HashMap<u16, Vec<usize>> = HashMap::new();
            for (i, entry) in parsed.entries.iter().enumerate() {
                entries_by_tag_id.entry(entry.tag_id()).or_default().push(i);
            }

            if let Some(previous) = edges.remove(&queued.offset) {
                directories[previous].next = Some(id);
            }
            if let Some(parent) = queued.parent {
                directories[parent].children.push(id);
            }

            for (i, entry) in parsed.entries.iter().enumerate() {
                if let Some(child) = entry.child_identity() {
                    queue.push_back(Queued {
                        identity: child.clone(),
                        offset: entry.value_offset(),
                        parent: Some(id),
                        parent_tag_index: Some(i),
                    });
                }
            }

            if parsed.next_offset != 0 {
                edges.insert(parsed.next_offset, id);
                queue.push_back(Queued {
                    identity: queued.identity.next_sibling(),
                    offset: parsed.next_offset,
                    parent: None,
                    parent_tag_index: None,
                });
            }

            directories.push(Directory {
                id,
                identity: queued.identity,
                offset: queued.offset,
                byte_order: self.byte_order,
                entries: parsed.entries,
                entries_by_tag_id,
                children: Vec::new(),
                parent: queued.parent,
                parent_tag_index: queued.parent_tag_index,
                next_offset: parsed.next_offset,
                next: None,
                thumbnail: parsed.thumbnail,
            });
        }

        debug!(furthest_offset = self.furthest_offset, "Collect finished");
        Ok(DirectoryIndex::new(
            directories,
            self.byte_order,
            Arc::clone(&self.registry),
        ))
    }
}

// =============================================================================
// Entry points
// =============================================================================

fn open(blob: Bytes) -> Result<(ExifHeader, SharedSource), ExifError> {
    let header = ExifHeader::parse(&blob)?;
    Ok((header, MemorySource::with_identifier(blob, "exif-blob").shared()))
}

/// Scan a blob that starts with its header, visiting every kept entry.
pub fn visit(
    blob: impl Into<Bytes>,
    registry: Arc<TagRegistry>,
    options: ScanOptions,
    visitor: &mut EntryVisitor<'_>,
) -> Result<ScanSummary, ExifError> {
    let (header, source) = open(blob.into())?;
    let mut scanner = Scanner::new(source, header.byte_order, registry, options);
    scanner.scan(&DirectoryIdentity::root(), header.first_ifd_offset, visitor)?;
    debug!(furthest_offset = scanner.furthest_offset(), "Scan finished");

    Ok(ScanSummary {
        header,
        furthest_offset: scanner.furthest_offset,
        unknown_tags: scanner.unknown_tags,
    })
}

/// Decode a blob that starts with its header into a directory index.
pub fn collect(
    blob: impl Into<Bytes>,
    registry: Arc<TagRegistry>,
    options: ScanOptions,
) -> Result<(ExifHeader, DirectoryIndex), ExifError> {
    let (header, source) = open(blob.into())?;
    let mut scanner = Scanner::new(source, header.byte_order, registry, options);
    let index = scanner.collect(header.first_ifd_offset)?;
    Ok((header, index.with_scan_report(scanner.furthest_offset, scanner.unknown_tags)))
}
