//! Tag registry.
//!
//! Maps `(directory kind, tag id)` and `(directory kind, tag name)` to a
//! [`TagDefinition`]. The standard registry is built once from the built-in
//! catalogue and shared behind an `Arc`; callers that need extra tags build
//! their own registry and inject it into the scanner and builder.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::warn;

use super::catalogue::STANDARD_TAGS;
use super::kinds::DirectoryKind;
use super::types::{TagType, TagValue};
use crate::error::ExifError;

/// Kinds searched by [`TagRegistry::find_first`] when no candidates are given.
pub const DEFAULT_GUESS_KINDS: [DirectoryKind; 2] = [DirectoryKind::Exif, DirectoryKind::Primary];

// =============================================================================
// TagDefinition
// =============================================================================

/// A registered tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDefinition {
    pub id: u16,
    pub name: String,
    pub kind: DirectoryKind,
    pub supported_types: Vec<TagType>,
}

impl TagDefinition {
    pub fn new(
        kind: DirectoryKind,
        id: u16,
        name: impl Into<String>,
        supported_types: Vec<TagType>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            supported_types,
        }
    }

    pub fn does_support_type(&self, tag_type: TagType) -> bool {
        self.supported_types.contains(&tag_type)
    }

    /// Type to store `value` as when the tag allows several.
    ///
    /// LONG wins over SHORT; RATIONAL and SRATIONAL are chosen by the value's
    /// sign. Returns `None` when the supported set is empty or has no rule.
    pub fn encoding_type(&self, value: &TagValue) -> Option<TagType> {
        match self.supported_types.as_slice() {
            [] => None,
            [only] => Some(*only),
            types => {
                let has = |t: TagType| types.contains(&t);
                if has(TagType::Long) && has(TagType::Short) {
                    Some(TagType::Long)
                } else if has(TagType::Rational) && has(TagType::SignedRational) {
                    match value {
                        TagValue::SignedRationals(_) => Some(TagType::SignedRational),
                        _ => Some(TagType::Rational),
                    }
                } else {
                    None
                }
            }
        }
    }
}

// =============================================================================
// TagRegistry
// =============================================================================

/// Index of known tags per directory kind.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    by_id: HashMap<(DirectoryKind, u16), TagDefinition>,
    by_name: HashMap<(DirectoryKind, String), u16>,
}

static STANDARD: OnceLock<Arc<TagRegistry>> = OnceLock::new();

impl TagRegistry {
    /// A registry with no tags.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A fresh registry holding the built-in catalogue.
    pub fn with_standard_tags() -> Self {
        let mut registry = Self::empty();
        for row in STANDARD_TAGS.iter() {
            let definition = TagDefinition::new(row.kind, row.id, row.name, row.types.to_vec());
            // The catalogue has no duplicates; a clash would only drop the later row.
            if let Err(err) = registry.add(definition) {
                warn!(error = %err, "Skipping duplicate catalogue row");
            }
        }
        registry
    }

    /// The shared standard registry, built on first use.
    ///
    /// Racing first callers block until the single build finishes.
    pub fn standard() -> Arc<TagRegistry> {
        Arc::clone(STANDARD.get_or_init(|| Arc::new(Self::with_standard_tags())))
    }

    /// Register a tag.
    ///
    /// # Errors
    /// - `DuplicateTag` if the id or the name is already taken in that kind
    pub fn add(&mut self, definition: TagDefinition) -> Result<(), ExifError> {
        let id_key = (definition.kind, definition.id);
        let name_key = (definition.kind, definition.name.clone());
        if self.by_id.contains_key(&id_key) || self.by_name.contains_key(&name_key) {
            return Err(ExifError::DuplicateTag {
                kind: definition.kind.name(),
                tag_id: definition.id,
            });
        }
        self.by_name.insert(name_key, definition.id);
        self.by_id.insert(id_key, definition);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Look a tag up in its own kind.
    pub fn get(&self, kind: DirectoryKind, tag_id: u16) -> Result<&TagDefinition, ExifError> {
        self.by_id
            .get(&(kind, tag_id))
            .ok_or(ExifError::TagNotFound {
                kind: kind.name(),
                tag_id,
            })
    }

    pub fn get_by_name(&self, kind: DirectoryKind, name: &str) -> Result<&TagDefinition, ExifError> {
        self.by_name
            .get(&(kind, name.to_string()))
            .and_then(|id| self.by_id.get(&(kind, *id)))
            .ok_or_else(|| ExifError::TagNameNotFound {
                kind: kind.name(),
                name: name.to_string(),
            })
    }

    /// Look a tag up in `kind`, then in every other kind.
    ///
    /// A hit in another kind is only a guess: the same id can mean something
    /// else there, with a different value type.
    pub fn search_all_kinds(&self, kind: DirectoryKind, tag_id: u16) -> Result<&TagDefinition, ExifError> {
        if let Ok(definition) = self.get(kind, tag_id) {
            return Ok(definition);
        }

        for other in DirectoryKind::ALL.into_iter().filter(|k| *k != kind) {
            if let Ok(definition) = self.get(other, tag_id) {
                warn!(
                    tag_id = format_args!("0x{tag_id:04x}"),
                    found_in = other.name(),
                    expected = kind.name(),
                    "Found tag in the wrong directory"
                );
                return Ok(definition);
            }
        }

        Err(ExifError::TagNotFound {
            kind: kind.name(),
            tag_id,
        })
    }

    /// First candidate kind that registers `tag_id` with `tag_type` among its
    /// supported types.
    ///
    /// `None` for `candidates` means [`DEFAULT_GUESS_KINDS`]. Used to recover
    /// tags written into the wrong directory by broken encoders.
    pub fn find_first(
        &self,
        tag_id: u16,
        tag_type: TagType,
        candidates: Option<&[DirectoryKind]>,
    ) -> Result<&TagDefinition, ExifError> {
        let candidates = candidates.unwrap_or(&DEFAULT_GUESS_KINDS);
        candidates
            .iter()
            .filter_map(|kind| self.get(*kind, tag_id).ok())
            .find(|definition| definition.does_support_type(tag_type))
            .ok_or(ExifError::TagNotFound {
                kind: candidates.first().copied().unwrap_or(DirectoryKind::Primary).name(),
                tag_id,
            })
    }

    /// All definitions owned by `kind`, ordered by id.
    pub fn definitions_for(&self, kind: DirectoryKind) -> Vec<&TagDefinition> {
        let mut definitions: Vec<&TagDefinition> =
            self.by_id.values().filter(|d| d.kind == kind).collect();
        definitions.sort_by_key(|d| d.id);
        definitions
    }
}
