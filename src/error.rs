use thiserror::Error;

/// I/O errors raised by a [`ByteSource`](crate::io::ByteSource)
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Requested range exceeds the source bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// The underlying source could not be read
    #[error("Read failed for {identifier}: {message}")]
    Read { identifier: String, message: String },
}

/// Errors raised while decoding a metadata blob or querying the tag registry.
///
/// Some variants only concern a single tag; see [`ExifError::is_tag_local`].
#[derive(Debug, Clone, Error)]
pub enum ExifError {
    /// I/O error while reading the blob
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Fewer than eight bytes were available for the header
    #[error("Header invalid: need 8 bytes, got {actual}")]
    HeaderTooShort { actual: usize },

    /// The first four bytes are neither `II*\0` nor `MM\0*`
    #[error("Header invalid: unrecognised signature {0:02x?}")]
    InvalidSignature([u8; 4]),

    /// No header could be found anywhere in the searched data
    #[error("No EXIF metadata found")]
    NoMetadata,

    /// An offset points outside the blob
    #[error("Invalid offset {offset}: blob size is {size}")]
    OffsetInvalid { offset: u64, size: u64 },

    /// The tag id is not registered for the directory kind
    #[error("Tag 0x{tag_id:04x} not found in {kind}")]
    TagNotFound { kind: &'static str, tag_id: u16 },

    /// No tag with this name is registered for the directory kind
    #[error("Tag {name:?} not found in {kind}")]
    TagNameNotFound { kind: &'static str, name: String },

    /// The type code on the wire is not a known primitive
    #[error("Tag 0x{tag_id:04x} has invalid type code {type_code}")]
    TagTypeNotValid { tag_id: u16, type_code: u16 },

    /// The type is valid but not allowed for this tag
    #[error("Tag 0x{tag_id:04x} in {kind} does not support type {tag_type}")]
    TagTypeNotSupported {
        kind: &'static str,
        tag_id: u16,
        tag_type: &'static str,
    },

    /// A definition with this id is already registered
    #[error("Tag 0x{tag_id:04x} already registered in {kind}")]
    DuplicateTag { kind: &'static str, tag_id: u16 },

    /// The tag id does not introduce a child directory under this kind
    #[error("Tag 0x{tag_id:04x} does not map to a child directory of {kind}")]
    ChildDirectoryNotMapped { kind: &'static str, tag_id: u16 },

    /// No decoder exists for this UNDEFINED-typed tag
    #[error("No decoder for undefined tag 0x{tag_id:04x} in {kind}")]
    UnhandledUndefinedTag { kind: &'static str, tag_id: u16 },

    /// The value bytes could not be interpreted
    #[error("Value unparseable: {0}")]
    ValueUnparseable(String),

    /// The directory does not carry a thumbnail
    #[error("No thumbnail present")]
    NoThumbnail,

    /// The blob has no GPS directory
    #[error("No GPS directory present")]
    NoGpsData,

    /// The GPS directory exists but its coordinates are unusable
    #[error("GPS coordinates not valid: {0}")]
    GpsCoordinatesNotValid(String),

    /// An operation was attempted on the wrong kind of directory
    #[error("Expected directory {expected}, found {actual}")]
    WrongDirectoryKind { expected: String, actual: String },

    /// No directory exists at the given path
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    /// A directory path could not be parsed
    #[error("Invalid directory path: {0}")]
    InvalidPath(String),

    /// Child-pointer entries and child directories disagree
    #[error("Dangling children in {path}: {children} children, {child_tags} child tags")]
    DanglingChildren {
        path: String,
        children: usize,
        child_tags: usize,
    },
}

impl ExifError {
    /// Whether the error only concerns one tag, so a directory scan can skip
    /// the tag and keep going.
    pub fn is_tag_local(&self) -> bool {
        matches!(
            self,
            ExifError::TagNotFound { .. }
                | ExifError::TagTypeNotValid { .. }
                | ExifError::TagTypeNotSupported { .. }
                | ExifError::UnhandledUndefinedTag { .. }
                | ExifError::ValueUnparseable(_)
        )
    }

    /// Whether the error came from a header probe, so a search may try the next offset.
    pub fn is_header_invalid(&self) -> bool {
        matches!(
            self,
            ExifError::HeaderTooShort { .. } | ExifError::InvalidSignature(_)
        )
    }
}

/// Errors raised while mutating a builder tree or encoding it to bytes
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    /// Decode or registry error
    #[error("EXIF error: {0}")]
    Exif(#[from] ExifError),

    /// No tag with this id exists in the builder
    #[error("Tag 0x{tag_id:04x} not found in builder {path}")]
    TagEntryNotFound { path: String, tag_id: u16 },

    /// No child builder is attached under this tag id
    #[error("Child builder for tag 0x{tag_id:04x} not found in {path}")]
    ChildBuilderNotFound { path: String, tag_id: u16 },

    /// Child builders must be attached with `add_child`
    #[error("Tag 0x{tag_id:04x} carries a child builder; use add_child")]
    ChildValueNotAllowed { tag_id: u16 },

    /// The child builder has no parent tag id (it is a root kind)
    #[error("Builder {path} cannot be attached as a child")]
    NotAChild { path: String },

    /// A child of the same kind already exists under the parent
    #[error("Child {path} already exists")]
    DuplicateChild { path: String },

    /// Parent and child disagree on byte order
    #[error("Child {path} byte order does not match its parent")]
    ByteOrderMismatch { path: String },

    /// Thumbnails are only stored on the thumbnail directory
    #[error("Thumbnail can only be set on IFD1, not {path}")]
    ThumbnailNotAllowed { path: String },

    /// Thumbnail data was empty
    #[error("Thumbnail data is empty")]
    EmptyThumbnail,

    /// Delete counts start at one
    #[error("Delete count must be at least 1, got {0}")]
    InvalidDeleteCount(usize),

    /// Position outside the builder tag list
    #[error("Position {position} out of range for {len} tags")]
    PositionOutOfRange { position: usize, len: usize },

    /// The value length is not a multiple of the type size
    #[error("Tag 0x{tag_id:04x}: {len} bytes is not a multiple of the {type_size}-byte unit")]
    Unaligned {
        tag_id: u16,
        len: usize,
        type_size: usize,
    },

    /// Dry run and real run disagree
    #[error("Encoder size mismatch in {what}: expected {expected}, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A directory table holds at most 65535 entries
    #[error("Builder {path} has {count} tags; a directory holds at most 65535")]
    TooManyTags { path: String, count: usize },

    /// An offset no longer fits in 32 bits
    #[error("Offset {0} exceeds the 32-bit address space")]
    OffsetOverflow(u64),
}
