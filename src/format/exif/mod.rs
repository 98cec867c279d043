//! EXIF/TIFF metadata directories.
//!
//! A metadata blob is an 8-byte header followed by a graph of directories
//! (IFDs). This module decodes that graph into a [`DirectoryIndex`], lets it be
//! rebuilt as a mutable [`Builder`] tree, and encodes a builder back to bytes.
//!
//! # Key Concepts
//!
//! - **Byte order**: the header signature (`II*\0` or `MM\0*`) fixes the
//!   endianness of every multi-byte value in the blob.
//!
//! - **Directory kinds**: IFD0/IFD1 form the primary sibling chain. The Exif and
//!   GPSInfo directories hang off IFD0 through pointer tags, and the Interop
//!   directory hangs off Exif. Every directory is named by its path, such as
//!   `IFD/Exif/Iop` or `IFD1`.
//!
//! - **Inline vs offset values**: values of four bytes or fewer live in the
//!   entry itself. Larger values are stored elsewhere in the blob and the entry
//!   carries their absolute offset.
//!
//! - **Registry**: tag ids are only meaningful per directory kind. The
//!   [`TagRegistry`] maps (kind, id) to a name and the set of types the tag
//!   may be stored as.

mod catalogue;

pub mod builder;
pub mod directory;
pub mod encoder;
pub mod entry;
pub mod gps;
pub mod header;
pub mod kinds;
pub mod registry;
pub mod scanner;
pub mod types;
pub mod undefined;

pub use builder::{Builder, BuilderTag, BuilderValue};
pub use directory::{Directory, DirectoryIndex, DirectoryNode, TagRecord};
pub use encoder::{encode_to_blob, table_size, Encoder, JournalDirection, JournalEvent};
pub use entry::{Entry, TAG_THUMBNAIL_OFFSET, TAG_THUMBNAIL_SIZE};
pub use gps::{gps_info_from_entries, GpsDegrees, GpsInfo};
pub use header::{ByteOrder, ExifHeader, EXIF_HEADER_SIZE};
pub use kinds::{DirectoryIdentity, DirectoryKind, TAG_EXIF_IFD, TAG_GPS_IFD, TAG_INTEROP_IFD};
pub use registry::{TagDefinition, TagRegistry};
pub use scanner::{collect, visit, ScanOptions, ScanSummary, Scanner, UnknownTag};
pub use types::{
    format_value, parse_value, translate_string_to_type, Rational, SignedRational, TagType,
    TagValue,
};
pub use undefined::{ComponentsLayout, UndefinedValue, UserCommentEncoding};
