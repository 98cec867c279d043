//! Decoded directory index.
//!
//! [`DirectoryIndex`] owns every directory found by a collect scan in a flat
//! arena. Directories refer to each other by arena id (parent, children, next
//! sibling), and [`DirectoryNode`] pairs a directory with its index so the
//! graph can be walked with plain method calls:
//!
//! ```text
//! IFD ──next──▶ IFD1
//!  ├─ Exif (0x8769)
//!  │   └─ Iop (0xA005)
//!  └─ GPSInfo (0x8825)
//! ```
//!
//! Directories are addressed by fully-qualified path ("IFD", "IFD1",
//! "IFD/Exif", "IFD/Exif/Iop", "IFD/GPSInfo").

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;

use super::entry::{Entry, MALFORMED_PLACEHOLDER};
use super::gps::{gps_info_from_entries, GpsInfo};
use super::header::ByteOrder;
use super::kinds::{DirectoryIdentity, DirectoryKind};
use super::registry::TagRegistry;
use super::scanner::UnknownTag;
use crate::error::ExifError;

// =============================================================================
// Directory
// =============================================================================

/// One parsed directory table.
#[derive(Debug)]
pub struct Directory {
    pub(crate) id: usize,
    pub(crate) identity: DirectoryIdentity,
    pub(crate) offset: u32,
    pub(crate) byte_order: ByteOrder,
    pub(crate) entries: Vec<Entry>,
    pub(crate) entries_by_tag_id: HashMap<u16, Vec<usize>>,
    pub(crate) children: Vec<usize>,
    pub(crate) parent: Option<usize>,
    pub(crate) parent_tag_index: Option<usize>,
    pub(crate) next_offset: u32,
    pub(crate) next: Option<usize>,
    pub(crate) thumbnail: Option<Bytes>,
}

impl Directory {
    /// Arena id within the owning index.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn identity(&self) -> &DirectoryIdentity {
        &self.identity
    }

    pub fn kind(&self) -> DirectoryKind {
        self.identity.kind()
    }

    /// Offset of the table within the blob.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Kept entries in table order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Next-directory link as read (0 when the chain ends or a cycle was cut).
    pub fn next_offset(&self) -> u32 {
        self.next_offset
    }

    /// Position of the pointer entry in the parent's entry list.
    pub fn parent_tag_index(&self) -> Option<usize> {
        self.parent_tag_index
    }

    /// All entries with the given id, in table order.
    ///
    /// # Errors
    /// - `TagNotFound` if there are none
    pub fn find_tag_with_id(&self, tag_id: u16) -> Result<Vec<&Entry>, ExifError> {
        match self.entries_by_tag_id.get(&tag_id) {
            Some(positions) if !positions.is_empty() => {
                Ok(positions.iter().map(|&i| &self.entries[i]).collect())
            }
            _ => Err(ExifError::TagNotFound {
                kind: self.identity.kind().name(),
                tag_id,
            }),
        }
    }

    /// Thumbnail bytes, verbatim.
    ///
    /// # Errors
    /// - `NoThumbnail` when the directory has no offset/size pair
    pub fn thumbnail(&self) -> Result<&Bytes, ExifError> {
        self.thumbnail.as_ref().ok_or(ExifError::NoThumbnail)
    }

    /// GPS information; only valid on a GPSInfo directory.
    pub fn gps_info(&self) -> Result<GpsInfo, ExifError> {
        if self.identity.kind() != DirectoryKind::GpsInfo {
            return Err(ExifError::WrongDirectoryKind {
                expected: DirectoryKind::GpsInfo.path(),
                actual: self.identity.to_string(),
            });
        }
        gps_info_from_entries(&self.entries)
    }
}

// =============================================================================
// DirectoryIndex
// =============================================================================

/// All directories of one decoded blob.
#[derive(Debug)]
pub struct DirectoryIndex {
    directories: Vec<Directory>,
    lookup: HashMap<String, usize>,
    byte_order: ByteOrder,
    registry: Arc<TagRegistry>,
    furthest_offset: u64,
    unknown_tags: Vec<UnknownTag>,
}

impl DirectoryIndex {
    pub(crate) fn new(
        directories: Vec<Directory>,
        byte_order: ByteOrder,
        registry: Arc<TagRegistry>,
    ) -> Self {
        let mut lookup = HashMap::with_capacity(directories.len());
        for directory in &directories {
            lookup
                .entry(directory.identity.to_string())
                .or_insert(directory.id);
        }
        Self {
            directories,
            lookup,
            byte_order,
            registry,
            furthest_offset: 0,
            unknown_tags: Vec::new(),
        }
    }

    pub(crate) fn with_scan_report(mut self, furthest_offset: u64, unknown_tags: Vec<UnknownTag>) -> Self {
        self.furthest_offset = furthest_offset;
        self.unknown_tags = unknown_tags;
        self
    }

    fn node(&self, id: usize) -> DirectoryNode<'_> {
        DirectoryNode {
            index: self,
            directory: &self.directories[id],
        }
    }

    pub fn len(&self) -> usize {
        self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn registry(&self) -> &Arc<TagRegistry> {
        &self.registry
    }

    /// End of the furthest structure touched while collecting.
    pub fn furthest_offset(&self) -> u64 {
        self.furthest_offset
    }

    /// Tags found in a directory that does not register them (universal search only).
    pub fn unknown_tags(&self) -> &[UnknownTag] {
        &self.unknown_tags
    }

    /// IFD0.
    pub fn root(&self) -> Option<DirectoryNode<'_>> {
        self.get(0)
    }

    pub fn get(&self, id: usize) -> Option<DirectoryNode<'_>> {
        (id < self.directories.len()).then(|| self.node(id))
    }

    /// Directories in discovery order (breadth-first).
    pub fn directories(&self) -> impl Iterator<Item = DirectoryNode<'_>> {
        (0..self.directories.len()).map(move |id| self.node(id))
    }

    /// Directory with the given fully-qualified path, e.g. "IFD1" or "IFD/Exif".
    pub fn lookup(&self, path: &str) -> Option<DirectoryNode<'_>> {
        self.lookup.get(path).map(|&id| self.node(id))
    }

    /// Walk from the root to the directory named by `path`, following sibling
    /// links for indices and child pointers for each lineage step.
    ///
    /// # Errors
    /// - `InvalidPath` if `path` does not parse
    /// - `DirectoryNotFound` if any step is missing
    pub fn resolve_path(&self, path: &str) -> Result<DirectoryNode<'_>, ExifError> {
        let identity = DirectoryIdentity::parse(path)?;
        let not_found = || ExifError::DirectoryNotFound(path.to_string());

        let mut lineage = identity.lineage().iter();
        let Some(&(first_kind, first_index)) = lineage.next() else {
            return Err(not_found());
        };
        if first_kind != DirectoryKind::Primary {
            return Err(ExifError::InvalidPath(path.to_string()));
        }

        let mut current = self.root().ok_or_else(not_found)?;
        for _ in 0..first_index {
            current = current.next_sibling().ok_or_else(not_found)?;
        }

        for &(kind, index) in lineage {
            current = current
                .children()
                .find(|child| child.kind() == kind)
                .ok_or_else(not_found)?;
            for _ in 0..index {
                current = current.next_sibling().ok_or_else(not_found)?;
            }
        }
        Ok(current)
    }

    /// Thumbnail from IFD1.
    ///
    /// # Errors
    /// - `NoThumbnail` if there is no IFD1 or it carries no thumbnail
    pub fn thumbnail(&self) -> Result<&Bytes, ExifError> {
        let node = self
            .lookup(&DirectoryIdentity::thumbnail().to_string())
            .ok_or(ExifError::NoThumbnail)?;
        node.directory.thumbnail()
    }

    /// GPS information from IFD/GPSInfo.
    ///
    /// # Errors
    /// - `NoGpsData` if there is no GPSInfo directory
    pub fn gps_info(&self) -> Result<GpsInfo, ExifError> {
        self.lookup(&DirectoryKind::GpsInfo.path())
            .ok_or(ExifError::NoGpsData)?
            .gps_info()
    }
}

// =============================================================================
// DirectoryNode
// =============================================================================

/// A directory together with the index that owns it.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryNode<'a> {
    index: &'a DirectoryIndex,
    directory: &'a Directory,
}

impl<'a> Deref for DirectoryNode<'a> {
    type Target = Directory;

    fn deref(&self) -> &Directory {
        self.directory
    }
}

/// One entry flattened for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRecord {
    pub path: String,
    pub tag_id: u16,
    pub tag_name: String,
    pub tag_type: &'static str,
    pub unit_count: u32,
    pub value: String,
}

impl TagRecord {
    fn from_entry(entry: &Entry) -> Self {
        Self {
            path: entry.identity().to_string(),
            tag_id: entry.tag_id(),
            tag_name: entry.tag_name().to_string(),
            tag_type: entry.tag_type().name(),
            unit_count: entry.unit_count(),
            value: entry
                .format()
                .unwrap_or_else(|_| MALFORMED_PLACEHOLDER.to_string()),
        }
    }
}

impl<'a> DirectoryNode<'a> {
    pub fn directory(&self) -> &'a Directory {
        self.directory
    }

    pub fn parent(&self) -> Option<DirectoryNode<'a>> {
        self.directory.parent.map(|id| self.index.node(id))
    }

    pub fn next_sibling(&self) -> Option<DirectoryNode<'a>> {
        self.directory.next.map(|id| self.index.node(id))
    }

    pub fn children(&self) -> impl Iterator<Item = DirectoryNode<'a>> + 'a {
        let index = self.index;
        self.directory.children.iter().map(move |&id| index.node(id))
    }

    /// First child directory of the given kind.
    ///
    /// # Errors
    /// - `DirectoryNotFound` if there is none
    pub fn child_with_kind(&self, kind: DirectoryKind) -> Result<DirectoryNode<'a>, ExifError> {
        self.children()
            .find(|child| child.kind() == kind)
            .ok_or_else(|| {
                ExifError::DirectoryNotFound(format!("{}/{}", self.identity, kind.name()))
            })
    }

    fn child_for_entry(&self, entry: &Entry) -> Result<DirectoryNode<'a>, ExifError> {
        let target = entry
            .child_identity()
            .map(|identity| identity.unindexed_path())
            .unwrap_or_default();
        self.children()
            .find(|child| child.identity.unindexed_path() == target)
            .ok_or_else(|| ExifError::DirectoryNotFound(target.clone()))
    }

    fn check_dangling(&self, child_tags: usize) -> Result<(), ExifError> {
        if child_tags != self.directory.children.len() {
            return Err(ExifError::DanglingChildren {
                path: self.identity.to_string(),
                children: self.directory.children.len(),
                child_tags,
            });
        }
        Ok(())
    }

    /// Entries with the given registered name.
    ///
    /// # Errors
    /// - `TagNameNotFound` if the name is not registered for this kind
    /// - `TagNotFound` if the directory holds no such entry
    pub fn find_tag_with_name(&self, name: &str) -> Result<Vec<&'a Entry>, ExifError> {
        let definition = self.index.registry.get_by_name(self.kind(), name)?;
        self.directory.find_tag_with_id(definition.id)
    }

    /// Every entry of this directory, its children and its following
    /// siblings, depth-first with children inlined after their pointer.
    ///
    /// # Errors
    /// - `DanglingChildren` if the child count disagrees with the pointer count
    pub fn dump_tags(&self) -> Result<Vec<&'a Entry>, ExifError> {
        let mut out = Vec::new();
        let mut current = Some(*self);
        while let Some(node) = current {
            let mut child_tags = 0;
            for entry in &node.directory.entries {
                out.push(entry);
                if entry.is_child_pointer() {
                    child_tags += 1;
                    out.extend(node.child_for_entry(entry)?.dump_tags()?);
                }
            }
            node.check_dangling(child_tags)?;
            current = node.next_sibling();
        }
        Ok(out)
    }

    fn phrase(&self) -> String {
        let parent = match self.parent() {
            Some(parent) => parent.identity.unindexed_path(),
            None => "ROOT".to_string(),
        };
        format!(
            "[{}]->[{}]:({})",
            parent,
            self.identity.unindexed_path(),
            self.identity.index()
        )
    }

    fn dump_tree_into(&self, lines: &mut Vec<String>, level: usize) -> Result<(), ExifError> {
        let mut current = Some(*self);
        while let Some(node) = current {
            let indent = " ".repeat(level * 2);
            let phrase = node.phrase();
            lines.push(format!("{indent}> IFD {phrase} TOP"));

            let mut child_tags = 0;
            for entry in &node.directory.entries {
                lines.push(format!("{indent}  - (0x{:04x})", entry.tag_id()));
                if entry.is_child_pointer() {
                    child_tags += 1;
                    node.child_for_entry(entry)?.dump_tree_into(lines, level + 1)?;
                }
            }
            node.check_dangling(child_tags)?;
            lines.push(format!("{indent}< IFD {phrase} BOTTOM"));

            current = node.next_sibling();
            if let Some(next) = current {
                lines.push(format!(
                    "{indent}* LINKING TO SIBLING IFD [{}]:({})",
                    next.identity.unindexed_path(),
                    next.identity.index()
                ));
            }
        }
        Ok(())
    }

    /// Indented outline of this directory, its children and siblings.
    pub fn dump_tree(&self) -> Result<Vec<String>, ExifError> {
        let mut lines = Vec::new();
        self.dump_tree_into(&mut lines, 0)?;
        Ok(lines)
    }

    /// Call `visitor` for every non-pointer entry, recursing into children
    /// and following the sibling chain.
    pub fn enumerate_tags_recursively<F>(&self, visitor: &mut F) -> Result<(), ExifError>
    where
        F: FnMut(DirectoryNode<'a>, &'a Entry) -> Result<(), ExifError>,
    {
        let mut current = Some(*self);
        while let Some(node) = current {
            for entry in &node.directory.entries {
                if entry.is_child_pointer() {
                    node.child_for_entry(entry)?
                        .enumerate_tags_recursively(visitor)?;
                } else {
                    visitor(node, entry)?;
                }
            }
            current = node.next_sibling();
        }
        Ok(())
    }

    /// Serializable rows for every entry reachable from here.
    pub fn tag_records(&self) -> Result<Vec<TagRecord>, ExifError> {
        Ok(self
            .dump_tags()?
            .into_iter()
            .map(TagRecord::from_entry)
            .collect())
    }
}
