//! Mutable directory trees for encoding.
//!
//! A [`Builder`] is one directory: an ordered tag list, an optional next
//! sibling and, on IFD1, an optional thumbnail. Child directories hang off
//! pointer tags whose value is a nested builder, so the whole tree is owned
//! by the root:
//!
//! ```text
//! Builder(IFD)
//!   tags: [Orientation, ExifTag -> Builder(IFD/Exif), ...]
//!   next: Builder(IFD1)
//!           tags: [JPEGInterchangeFormat, JPEGInterchangeFormatLength]
//!           thumbnail: <bytes>
//! ```
//!
//! Ordinary tag values are stored pre-encoded in the builder's byte order.
//! Builders can be seeded from a decoded directory with
//! [`Builder::add_tags_from_existing`] or [`Builder::new_from_existing_chain`].

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use super::directory::DirectoryNode;
use super::entry::{TAG_THUMBNAIL_OFFSET, TAG_THUMBNAIL_SIZE};
use super::header::ByteOrder;
use super::kinds::{DirectoryIdentity, DirectoryKind};
use super::registry::{TagDefinition, TagRegistry};
use super::types::{dump_bytes, TagType, TagValue};
use crate::error::{BuildError, ExifError};

// =============================================================================
// BuilderTag
// =============================================================================

/// Value held by a builder tag.
#[derive(Debug, Clone)]
pub enum BuilderValue {
    /// Encoded value bytes
    Bytes(Vec<u8>),
    /// Nested directory (pointer tags only)
    Child(Box<Builder>),
    /// Thumbnail data; the offset tag is written as a pointer to it
    Thumbnail(Bytes),
}

impl BuilderValue {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            BuilderValue::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_child(&self) -> Option<&Builder> {
        match self {
            BuilderValue::Child(child) => Some(child),
            _ => None,
        }
    }

    pub fn is_child(&self) -> bool {
        matches!(self, BuilderValue::Child(_))
    }
}

/// One tag in a builder.
#[derive(Debug, Clone)]
pub struct BuilderTag {
    path: String,
    tag_id: u16,
    tag_type: TagType,
    value: BuilderValue,
}

impl BuilderTag {
    /// A tag from already-encoded bytes. `path` is the unindexed path of the
    /// owning directory.
    pub fn new(path: impl Into<String>, tag_id: u16, tag_type: TagType, value: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            tag_id,
            tag_type: tag_type.wire_type(),
            value: BuilderValue::Bytes(value),
        }
    }

    /// Encode a typed value for a registered tag.
    ///
    /// The stored type follows [`TagDefinition::encoding_type`]: LONG wins
    /// over SHORT (SHORT values are widened) and rationals follow their sign.
    ///
    /// # Errors
    /// - `TagTypeNotSupported` if the value cannot be stored as any type the
    ///   tag allows
    pub fn standard(
        definition: &TagDefinition,
        value: TagValue,
        byte_order: ByteOrder,
    ) -> Result<Self, BuildError> {
        let value_type = value.tag_type();
        let unsupported = || ExifError::TagTypeNotSupported {
            kind: definition.kind.name(),
            tag_id: definition.id,
            tag_type: value_type.name(),
        };

        let target = definition
            .encoding_type(&value)
            .or_else(|| definition.does_support_type(value_type).then_some(value_type))
            .ok_or_else(unsupported)?;
        let value = coerce(value, target).ok_or_else(unsupported)?;
        let encoded = value.encode(byte_order)?;

        Ok(Self::new(definition.kind.path(), definition.id, target, encoded.bytes))
    }

    fn child(path: String, child: Builder) -> Self {
        Self {
            path,
            tag_id: child.identity.kind().tag_id(),
            tag_type: TagType::Long,
            value: BuilderValue::Child(Box::new(child)),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn tag_id(&self) -> u16 {
        self.tag_id
    }

    pub fn tag_type(&self) -> TagType {
        self.tag_type
    }

    pub fn value(&self) -> &BuilderValue {
        &self.value
    }
}

impl fmt::Display for BuilderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match &self.value {
            BuilderValue::Bytes(v) => dump_bytes(v),
            BuilderValue::Child(child) => child.identity.unindexed_path(),
            BuilderValue::Thumbnail(data) => format!("thumbnail ({} bytes)", data.len()),
        };
        write!(
            f,
            "BuilderTag<PATH=[{}] ID=(0x{:04x}) TYPE=[{}] VALUE=[{}]>",
            self.path, self.tag_id, self.tag_type, value
        )
    }
}

/// Convert `value` so it can be stored as `target`.
fn coerce(value: TagValue, target: TagType) -> Option<TagValue> {
    if value.tag_type() == target {
        return Some(value);
    }
    match (value, target) {
        (TagValue::Shorts(v), TagType::Long) => {
            Some(TagValue::Longs(v.into_iter().map(u32::from).collect()))
        }
        (TagValue::Ascii(s), TagType::AsciiNoNul) => Some(TagValue::AsciiNoNul(s)),
        (TagValue::AsciiNoNul(s), TagType::Ascii) => Some(TagValue::Ascii(s)),
        _ => None,
    }
}

// =============================================================================
// Builder
// =============================================================================

/// A directory under construction.
#[derive(Debug, Clone)]
pub struct Builder {
    pub(crate) identity: DirectoryIdentity,
    pub(crate) byte_order: ByteOrder,
    registry: Arc<TagRegistry>,
    pub(crate) tags: Vec<BuilderTag>,
    existing_offset: u32,
    pub(crate) next: Option<Box<Builder>>,
    thumbnail: Option<Bytes>,
}

impl Builder {
    pub fn new(registry: Arc<TagRegistry>, identity: DirectoryIdentity, byte_order: ByteOrder) -> Self {
        Self {
            identity,
            byte_order,
            registry,
            tags: Vec::new(),
            existing_offset: 0,
            next: None,
            thumbnail: None,
        }
    }

    /// An empty IFD0 using the standard registry.
    pub fn new_root(byte_order: ByteOrder) -> Self {
        Self::new(TagRegistry::standard(), DirectoryIdentity::root(), byte_order)
    }

    /// An empty builder with the identity and byte order of a decoded directory.
    pub fn new_with_existing(node: DirectoryNode<'_>, registry: Arc<TagRegistry>) -> Self {
        let mut builder = Self::new(registry, node.identity().clone(), node.byte_order());
        builder.existing_offset = node.offset();
        builder
    }

    /// Builders for a decoded directory and every sibling after it, each
    /// populated from its directory.
    pub fn new_from_existing_chain(
        node: DirectoryNode<'_>,
        registry: Arc<TagRegistry>,
    ) -> Result<Self, BuildError> {
        let mut first = Self::new_with_existing(node, Arc::clone(&registry));
        first.add_tags_from_existing(node, None, None)?;

        let mut tail: &mut Builder = &mut first;
        let mut current = node.next_sibling();
        while let Some(directory) = current {
            let mut builder = Self::new_with_existing(directory, Arc::clone(&registry));
            builder.add_tags_from_existing(directory, None, None)?;
            tail = tail.next.insert(Box::new(builder)).as_mut();
            current = directory.next_sibling();
        }
        Ok(first)
    }

    pub fn identity(&self) -> &DirectoryIdentity {
        &self.identity
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn registry(&self) -> &Arc<TagRegistry> {
        &self.registry
    }

    pub fn tags(&self) -> &[BuilderTag] {
        &self.tags
    }

    /// Offset the directory was decoded from, or 0 for a new one.
    pub fn existing_offset(&self) -> u32 {
        self.existing_offset
    }

    pub fn next(&self) -> Option<&Builder> {
        self.next.as_deref()
    }

    pub fn next_mut(&mut self) -> Option<&mut Builder> {
        self.next.as_deref_mut()
    }

    /// Link the following sibling, replacing any existing link.
    ///
    /// # Errors
    /// - `ByteOrderMismatch` if `next` uses another byte order
    pub fn set_next(&mut self, next: Builder) -> Result<(), BuildError> {
        if next.byte_order != self.byte_order {
            return Err(BuildError::ByteOrderMismatch {
                path: next.identity.to_string(),
            });
        }
        self.next = Some(Box::new(next));
        Ok(())
    }

    /// Unlink and return the following sibling.
    pub fn take_next(&mut self) -> Option<Builder> {
        self.next.take().map(|next| *next)
    }

    pub fn thumbnail(&self) -> Option<&Bytes> {
        self.thumbnail.as_ref()
    }

    fn path(&self) -> String {
        self.identity.to_string()
    }

    fn not_found(&self, tag_id: u16) -> BuildError {
        BuildError::TagEntryNotFound {
            path: self.path(),
            tag_id,
        }
    }

    // -------------------------------------------------------------------------
    // Thumbnail
    // -------------------------------------------------------------------------

    /// Store thumbnail data and set the offset/size tag pair.
    ///
    /// # Errors
    /// - `ThumbnailNotAllowed` unless this builder is IFD1
    /// - `EmptyThumbnail` for empty data
    pub fn set_thumbnail(&mut self, data: impl Into<Bytes>) -> Result<(), BuildError> {
        if !self.identity.is_thumbnail() {
            return Err(BuildError::ThumbnailNotAllowed { path: self.path() });
        }
        let data = data.into();
        if data.is_empty() {
            return Err(BuildError::EmptyThumbnail);
        }
        let len = u32::try_from(data.len()).map_err(|_| BuildError::OffsetOverflow(data.len() as u64))?;

        self.thumbnail = Some(data.clone());
        self.set(BuilderTag {
            path: self.identity.unindexed_path(),
            tag_id: TAG_THUMBNAIL_OFFSET,
            tag_type: TagType::Long,
            value: BuilderValue::Thumbnail(data),
        })?;
        self.set_standard(TAG_THUMBNAIL_SIZE, TagValue::Longs(vec![len]))
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// Positions of up to `max_found` tags with `tag_id`; 0 means no limit.
    pub fn find_n(&self, tag_id: u16, max_found: usize) -> Vec<usize> {
        let matches = self
            .tags
            .iter()
            .enumerate()
            .filter(|(_, tag)| tag.tag_id == tag_id)
            .map(|(i, _)| i);
        if max_found == 0 {
            matches.collect()
        } else {
            matches.take(max_found).collect()
        }
    }

    /// Position of the first tag with `tag_id`.
    pub fn find(&self, tag_id: u16) -> Result<usize, BuildError> {
        self.find_n(tag_id, 1)
            .first()
            .copied()
            .ok_or_else(|| self.not_found(tag_id))
    }

    pub fn find_tag(&self, tag_id: u16) -> Result<&BuilderTag, BuildError> {
        let position = self.find(tag_id)?;
        Ok(&self.tags[position])
    }

    pub fn find_tag_with_name(&self, name: &str) -> Result<&BuilderTag, BuildError> {
        let definition = self.registry.get_by_name(self.identity.kind(), name)?;
        self.find_tag(definition.id)
    }

    /// Child builder attached under `tag_id`.
    pub fn child_with_tag_id(&self, tag_id: u16) -> Result<&Builder, BuildError> {
        self.tags
            .iter()
            .filter_map(|tag| tag.value.as_child())
            .find(|child| child.identity.kind().tag_id() == tag_id)
            .ok_or_else(|| BuildError::ChildBuilderNotFound {
                path: self.path(),
                tag_id,
            })
    }

    pub fn child_with_tag_id_mut(&mut self, tag_id: u16) -> Result<&mut Builder, BuildError> {
        let path = self.path();
        self.tags
            .iter_mut()
            .filter_map(|tag| match &mut tag.value {
                BuilderValue::Child(child) => Some(child.as_mut()),
                _ => None,
            })
            .find(|child| child.identity.kind().tag_id() == tag_id)
            .ok_or(BuildError::ChildBuilderNotFound { path, tag_id })
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    fn check_ordinary(&self, tag: &BuilderTag) -> Result<(), BuildError> {
        match &tag.value {
            BuilderValue::Child(_) => Err(BuildError::ChildValueNotAllowed { tag_id: tag.tag_id }),
            BuilderValue::Thumbnail(_) if !self.identity.is_thumbnail() => {
                Err(BuildError::ThumbnailNotAllowed { path: self.path() })
            }
            _ => Ok(()),
        }
    }

    /// Append a tag.
    ///
    /// # Errors
    /// - `ChildValueNotAllowed` for nested builders; use [`Builder::add_child`]
    pub fn add(&mut self, tag: BuilderTag) -> Result<(), BuildError> {
        self.check_ordinary(&tag)?;
        self.tags.push(tag);
        Ok(())
    }

    /// Replace the first tag with the same id, or append.
    pub fn set(&mut self, tag: BuilderTag) -> Result<(), BuildError> {
        self.check_ordinary(&tag)?;
        match self.find_n(tag.tag_id, 1).first() {
            Some(&position) => self.tags[position] = tag,
            None => self.tags.push(tag),
        }
        Ok(())
    }

    /// Replace the first tag with `tag_id`.
    pub fn replace(&mut self, tag_id: u16, tag: BuilderTag) -> Result<(), BuildError> {
        self.check_ordinary(&tag)?;
        let position = self.find(tag_id)?;
        self.tags[position] = tag;
        Ok(())
    }

    pub fn replace_at(&mut self, position: usize, tag: BuilderTag) -> Result<(), BuildError> {
        self.check_ordinary(&tag)?;
        let len = self.tags.len();
        let slot = self
            .tags
            .get_mut(position)
            .ok_or(BuildError::PositionOutOfRange { position, len })?;
        *slot = tag;
        Ok(())
    }

    /// Delete the first `n` tags with `tag_id`.
    ///
    /// # Errors
    /// - `InvalidDeleteCount` for `n == 0`
    /// - `TagEntryNotFound` if fewer than `n` exist; earlier matches are
    ///   already removed
    pub fn delete_n(&mut self, tag_id: u16, n: usize) -> Result<(), BuildError> {
        if n < 1 {
            return Err(BuildError::InvalidDeleteCount(n));
        }
        for _ in 0..n {
            let position = self.find(tag_id)?;
            self.tags.remove(position);
        }
        Ok(())
    }

    pub fn delete_first(&mut self, tag_id: u16) -> Result<(), BuildError> {
        self.delete_n(tag_id, 1)
    }

    /// Delete every tag with `tag_id`, returning how many were removed.
    pub fn delete_all(&mut self, tag_id: u16) -> usize {
        let before = self.tags.len();
        self.tags.retain(|tag| tag.tag_id != tag_id);
        before - self.tags.len()
    }

    fn standard_tag(&self, definition: &TagDefinition, value: TagValue) -> Result<BuilderTag, BuildError> {
        BuilderTag::standard(definition, value, self.byte_order)
    }

    /// Append a registered tag from a typed value.
    pub fn add_standard(&mut self, tag_id: u16, value: impl Into<TagValue>) -> Result<(), BuildError> {
        let definition = self.registry.get(self.identity.kind(), tag_id)?;
        let tag = self.standard_tag(definition, value.into())?;
        self.add(tag)
    }

    pub fn add_standard_with_name(
        &mut self,
        name: &str,
        value: impl Into<TagValue>,
    ) -> Result<(), BuildError> {
        let definition = self.registry.get_by_name(self.identity.kind(), name)?;
        let tag = self.standard_tag(definition, value.into())?;
        self.add(tag)
    }

    /// Replace or append a registered tag from a typed value.
    pub fn set_standard(&mut self, tag_id: u16, value: impl Into<TagValue>) -> Result<(), BuildError> {
        let definition = self.registry.get(self.identity.kind(), tag_id)?;
        let tag = self.standard_tag(definition, value.into())?;
        self.set(tag)
    }

    pub fn set_standard_with_name(
        &mut self,
        name: &str,
        value: impl Into<TagValue>,
    ) -> Result<(), BuildError> {
        let definition = self.registry.get_by_name(self.identity.kind(), name)?;
        let tag = self.standard_tag(definition, value.into())?;
        self.set(tag)
    }

    // -------------------------------------------------------------------------
    // Children
    // -------------------------------------------------------------------------

    /// Attach a child directory under its pointer tag.
    ///
    /// # Errors
    /// - `NotAChild` if the child's kind does not hang off this kind
    /// - `ByteOrderMismatch` if the byte orders differ
    /// - `DuplicateChild` if a child of that kind is already attached
    pub fn add_child(&mut self, child: Builder) -> Result<(), BuildError> {
        let kind = child.identity.kind();
        if kind.parent() != Some(self.identity.kind()) {
            return Err(BuildError::NotAChild {
                path: child.identity.to_string(),
            });
        }
        if child.byte_order != self.byte_order {
            return Err(BuildError::ByteOrderMismatch {
                path: child.identity.to_string(),
            });
        }
        if self.tags.iter().any(|tag| tag.tag_id == kind.tag_id()) {
            return Err(BuildError::DuplicateChild {
                path: child.identity.unindexed_path(),
            });
        }

        self.tags
            .push(BuilderTag::child(self.identity.unindexed_path(), child));
        Ok(())
    }

    fn next_or_create(&mut self) -> &mut Builder {
        let identity = self.identity.next_sibling();
        let registry = Arc::clone(&self.registry);
        let byte_order = self.byte_order;
        self.next
            .get_or_insert_with(|| Box::new(Builder::new(registry, identity, byte_order)))
    }

    fn child_or_create(&mut self, kind: DirectoryKind) -> Result<&mut Builder, BuildError> {
        let existing = self
            .tags
            .iter()
            .position(|tag| matches!(&tag.value, BuilderValue::Child(c) if c.identity.kind() == kind));
        let position = match existing {
            Some(position) => position,
            None => {
                let identity = self.identity.new_child(kind)?;
                let child = Builder::new(Arc::clone(&self.registry), identity, self.byte_order);
                self.add_child(child)?;
                self.tags.len() - 1
            }
        };

        match &mut self.tags[position].value {
            BuilderValue::Child(child) => Ok(child.as_mut()),
            _ => Err(BuildError::ChildBuilderNotFound {
                path: self.identity.to_string(),
                tag_id: kind.tag_id(),
            }),
        }
    }

    /// The builder at a fully-qualified path below this root, creating
    /// missing siblings and children on the way.
    ///
    /// # Errors
    /// - `InvalidPath` if the path does not parse or does not start at IFD
    pub fn get_or_create(&mut self, path: &str) -> Result<&mut Builder, BuildError> {
        let identity = DirectoryIdentity::parse(path)?;
        let mut lineage = identity.lineage().iter();
        match lineage.next() {
            Some(&(DirectoryKind::Primary, _)) if self.identity == DirectoryIdentity::root() => {}
            _ => return Err(ExifError::InvalidPath(path.to_string()).into()),
        }

        let mut current: &mut Builder = self;
        for _ in 0..identity.lineage()[0].1 {
            current = current.next_or_create();
        }
        for &(kind, index) in lineage {
            current = current.child_or_create(kind)?;
            for _ in 0..index {
                current = current.next_or_create();
            }
        }
        Ok(current)
    }

    // -------------------------------------------------------------------------
    // Seeding from decoded data
    // -------------------------------------------------------------------------

    /// Copy the entries of a decoded directory.
    ///
    /// Values are copied verbatim; child directories become nested builders
    /// (with their sibling chains). The thumbnail pair is rebuilt last through
    /// [`Builder::set_thumbnail`]. Empty or absent `include` means every tag.
    pub fn add_tags_from_existing(
        &mut self,
        node: DirectoryNode<'_>,
        include: Option<&[u16]>,
        exclude: Option<&[u16]>,
    ) -> Result<(), BuildError> {
        let path = node.identity().unindexed_path();
        for (position, entry) in node.entries().iter().enumerate() {
            if entry.is_thumbnail_offset() || entry.is_thumbnail_size() {
                continue;
            }
            let tag_id = entry.tag_id();
            if exclude.is_some_and(|ids| ids.contains(&tag_id)) {
                continue;
            }
            if include.is_some_and(|ids| !ids.is_empty() && !ids.contains(&tag_id)) {
                continue;
            }

            let tag = if entry.is_child_pointer() {
                let child = node
                    .children()
                    .find(|child| child.parent_tag_index() == Some(position))
                    .ok_or_else(|| BuildError::ChildBuilderNotFound {
                        path: node.identity().to_string(),
                        tag_id,
                    })?;
                let child = Builder::new_from_existing_chain(child, Arc::clone(&self.registry))?;
                BuilderTag::child(path.clone(), child)
            } else {
                BuilderTag::new(path.clone(), tag_id, entry.tag_type(), entry.raw_bytes()?)
            };

            debug!(path = %node.identity(), tag = %tag, "Copying existing tag");
            self.tags.push(tag);
        }

        match node.thumbnail() {
            Ok(data) => self.set_thumbnail(data.clone()),
            Err(ExifError::NoThumbnail) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    // -------------------------------------------------------------------------
    // Dumps
    // -------------------------------------------------------------------------

    fn dump_chain(first: &Builder, prefix: &str, tag_id: u16, lines: &mut Vec<String>) {
        let mut current = Some(first);
        let mut sibling_index = 0;
        while let Some(builder) = current {
            let path = builder.identity.to_string();
            let kind_tag_id = builder.identity.kind().tag_id();
            lines.push(format!(
                "IFD<PARENTS=[{prefix}] FQ-IFD-PATH=[{path}] IFD-INDEX=({sibling_index}) IFD-TAG-ID=(0x{kind_tag_id:04x}) TAG=[0x{tag_id:04x}]>"
            ));

            for (i, tag) in builder.tags.iter().enumerate() {
                let child = tag.value.as_child();
                let child_name = child.map(|c| c.identity.unindexed_path()).unwrap_or_default();
                lines.push(format!(
                    "TAG<PARENTS=[{prefix}] FQ-IFD-PATH=[{path}] IFD-TAG-ID=(0x{kind_tag_id:04x}) CHILD-IFD=[{child_name}] TAG-INDEX=({i}) TAG=[0x{:04x}]>",
                    tag.tag_id
                ));

                if let Some(child) = child {
                    let own = builder.identity.unindexed_path();
                    let child_prefix = if prefix.is_empty() {
                        own
                    } else {
                        format!("{prefix}->{own}")
                    };
                    Self::dump_chain(child, &child_prefix, tag.tag_id, lines);
                }
            }

            sibling_index += 1;
            current = builder.next.as_deref();
        }
    }

    /// One line per directory and per tag, depth-first through children and
    /// along the sibling chain.
    pub fn dump_to_strings(&self) -> Vec<String> {
        let mut lines = Vec::new();
        Self::dump_chain(self, "", 0, &mut lines);
        lines
    }
}

impl fmt::Display for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let next = self
            .next
            .as_ref()
            .map(|next| next.identity.unindexed_path())
            .unwrap_or_default();
        write!(
            f,
            "Builder<PATH=[{}] TAG-ID=(0x{:04x}) COUNT=({}) OFF=(0x{:04x}) NEXT-IFD-PATH=[{}]>",
            self.identity.unindexed_path(),
            self.identity.kind().tag_id(),
            self.tags.len(),
            self.existing_offset,
            next
        )
    }
}
