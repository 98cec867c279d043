//! Directory kinds and identities.
//!
//! Known directories form a fixed tree:
//!
//! ```text
//! IFD          (primary image; IFD1 in the same chain is the thumbnail)
//! ├── Exif     (tag 0x8769)
//! │   └── Iop  (tag 0xA005)
//! └── GPSInfo  (tag 0x8825)
//! ```
//!
//! A [`DirectoryIdentity`] places one concrete directory in that tree, with a
//! sibling index at every level. Its display form is the fully-qualified path
//! (`IFD1`, `IFD/Exif`, `IFD/Exif/Iop`); index 0 is left out.

use std::fmt;

use crate::error::ExifError;

/// Tag id of the Exif sub-directory pointer
pub const TAG_EXIF_IFD: u16 = 0x8769;

/// Tag id of the GPS sub-directory pointer
pub const TAG_GPS_IFD: u16 = 0x8825;

/// Tag id of the interoperability sub-directory pointer
pub const TAG_INTEROP_IFD: u16 = 0xA005;

/// Sibling index of the thumbnail directory in the primary chain
pub const THUMBNAIL_INDEX: u32 = 1;

// =============================================================================
// DirectoryKind
// =============================================================================

/// Type of a directory in the kind tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DirectoryKind {
    /// Root chain: IFD0 (main image), IFD1 (thumbnail)
    Primary,
    Exif,
    GpsInfo,
    /// Interoperability directory under Exif
    Interop,
}

impl DirectoryKind {
    pub const ALL: [DirectoryKind; 4] = [
        DirectoryKind::Primary,
        DirectoryKind::Exif,
        DirectoryKind::GpsInfo,
        DirectoryKind::Interop,
    ];

    /// Unqualified path component.
    pub fn name(self) -> &'static str {
        match self {
            DirectoryKind::Primary => "IFD",
            DirectoryKind::Exif => "Exif",
            DirectoryKind::GpsInfo => "GPSInfo",
            DirectoryKind::Interop => "Iop",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Tag id a parent directory uses to point at this kind (0 for the root).
    pub fn tag_id(self) -> u16 {
        match self {
            DirectoryKind::Primary => 0,
            DirectoryKind::Exif => TAG_EXIF_IFD,
            DirectoryKind::GpsInfo => TAG_GPS_IFD,
            DirectoryKind::Interop => TAG_INTEROP_IFD,
        }
    }

    pub fn parent(self) -> Option<DirectoryKind> {
        match self {
            DirectoryKind::Primary => None,
            DirectoryKind::Exif | DirectoryKind::GpsInfo => Some(DirectoryKind::Primary),
            DirectoryKind::Interop => Some(DirectoryKind::Exif),
        }
    }

    pub fn children(self) -> &'static [DirectoryKind] {
        match self {
            DirectoryKind::Primary => &[DirectoryKind::Exif, DirectoryKind::GpsInfo],
            DirectoryKind::Exif => &[DirectoryKind::Interop],
            DirectoryKind::GpsInfo | DirectoryKind::Interop => &[],
        }
    }

    /// Child kind introduced by `tag_id` in a directory of this kind.
    ///
    /// `None` means the tag is an ordinary leaf.
    pub fn child_for_tag(self, tag_id: u16) -> Option<DirectoryKind> {
        self.children()
            .iter()
            .copied()
            .find(|child| child.tag_id() == tag_id)
    }

    /// Unindexed path from the root, e.g. `IFD/Exif/Iop`.
    pub fn path(self) -> String {
        match self.parent() {
            Some(parent) => format!("{}/{}", parent.path(), self.name()),
            None => self.name().to_string(),
        }
    }
}

impl fmt::Display for DirectoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// DirectoryIdentity
// =============================================================================

/// Position of one directory in the tree: the kind and sibling index at every
/// level from the root down.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirectoryIdentity {
    lineage: Vec<(DirectoryKind, u32)>,
}

impl DirectoryIdentity {
    /// IFD0.
    pub fn root() -> Self {
        Self {
            lineage: vec![(DirectoryKind::Primary, 0)],
        }
    }

    /// IFD1.
    pub fn thumbnail() -> Self {
        Self {
            lineage: vec![(DirectoryKind::Primary, THUMBNAIL_INDEX)],
        }
    }

    pub fn kind(&self) -> DirectoryKind {
        self.lineage
            .last()
            .map(|(kind, _)| *kind)
            .unwrap_or(DirectoryKind::Primary)
    }

    /// Sibling index at the deepest level.
    pub fn index(&self) -> u32 {
        self.lineage.last().map(|(_, index)| *index).unwrap_or(0)
    }

    pub fn lineage(&self) -> &[(DirectoryKind, u32)] {
        &self.lineage
    }

    pub fn depth(&self) -> usize {
        self.lineage.len()
    }

    pub fn is_thumbnail(&self) -> bool {
        self.lineage == [(DirectoryKind::Primary, THUMBNAIL_INDEX)]
    }

    /// Identity of the first `kind` directory under this one.
    ///
    /// # Errors
    /// - `ChildDirectoryNotMapped` if `kind` is not a child of this directory's kind
    pub fn new_child(&self, kind: DirectoryKind) -> Result<Self, ExifError> {
        if kind.parent() != Some(self.kind()) {
            return Err(ExifError::ChildDirectoryNotMapped {
                kind: self.kind().name(),
                tag_id: kind.tag_id(),
            });
        }
        let mut lineage = self.lineage.clone();
        lineage.push((kind, 0));
        Ok(Self { lineage })
    }

    /// Identity of the child introduced by `tag_id`, if that tag is a pointer.
    pub fn child_for_tag(&self, tag_id: u16) -> Option<Self> {
        let kind = self.kind().child_for_tag(tag_id)?;
        self.new_child(kind).ok()
    }

    /// Same position with a different sibling index.
    pub fn with_index(&self, index: u32) -> Self {
        let mut lineage = self.lineage.clone();
        if let Some(last) = lineage.last_mut() {
            last.1 = index;
        }
        Self { lineage }
    }

    /// The following sibling in this chain.
    pub fn next_sibling(&self) -> Self {
        self.with_index(self.index() + 1)
    }

    pub fn parent(&self) -> Option<Self> {
        (self.lineage.len() > 1).then(|| Self {
            lineage: self.lineage[..self.lineage.len() - 1].to_vec(),
        })
    }

    /// Path without sibling indices, e.g. `IFD/Exif` for `IFD1/Exif`.
    pub fn unindexed_path(&self) -> String {
        self.kind().path()
    }

    /// Parse a fully-qualified path such as `IFD1` or `IFD/Exif/Iop`.
    ///
    /// # Errors
    /// - `InvalidPath` if a component is unknown, malformed, or out of place
    pub fn parse(path: &str) -> Result<Self, ExifError> {
        let invalid = || ExifError::InvalidPath(path.to_string());
        let mut lineage: Vec<(DirectoryKind, u32)> = Vec::new();

        for component in path.split('/') {
            let split = component
                .find(|c: char| c.is_ascii_digit())
                .unwrap_or(component.len());
            let (name, digits) = component.split_at(split);
            let kind = DirectoryKind::from_name(name).ok_or_else(invalid)?;
            let index = if digits.is_empty() {
                0
            } else {
                digits.parse::<u32>().map_err(|_| invalid())?
            };

            let expected_parent = lineage.last().map(|(k, _)| *k);
            if kind.parent() != expected_parent {
                return Err(invalid());
            }
            lineage.push((kind, index));
        }

        Ok(Self { lineage })
    }
}

impl Default for DirectoryIdentity {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for DirectoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (kind, index)) in self.lineage.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(kind.name())?;
            if *index > 0 {
                write!(f, "{index}")?;
            }
        }
        Ok(())
    }
}
