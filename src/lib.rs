//! # exif-codec
//!
//! Decode, inspect, rebuild and re-encode EXIF/TIFF metadata blobs.
//!
//! The library works on the self-contained metadata region of an image: an
//! 8-byte header followed by directories of tagged values. It does not parse
//! image containers; [`format::detect`] simply finds the header in raw bytes.
//!
//! ## Features
//!
//! - **Decoding**: every directory (IFD0, IFD1, Exif, GPSInfo, Interop) is
//!   decoded into an indexed graph that can be queried by path and tag
//! - **Typed values**: the nine primitive TIFF types plus decoders for the
//!   standard UNDEFINED-typed tags (UserComment, MakerNote, ...)
//! - **GPS and thumbnails**: GPS coordinates in degrees and decimal form, and
//!   the embedded JPEG thumbnail from IFD1
//! - **Rebuilding**: a mutable builder tree, seeded from a decoded blob or
//!   built from scratch, encodes back to a valid blob
//!
//! ## Architecture
//!
//! - [`io`] - Random-access byte sources and cursors
//! - [`mod@format`] - Blob search and the EXIF codec
//! - [`error`] - Error types for each layer
//! - [`config`] - CLI configuration for the `exif-codec` binary
//!
//! ## Example
//!
//! ```rust,no_run
//! use exif_codec::{collect, search_and_extract, ScanOptions, TagRegistry};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let file = std::fs::read("photo.jpg")?;
//!     let blob = search_and_extract(&file)?;
//!
//!     let (_header, index) = collect(blob.to_vec(), TagRegistry::standard(), ScanOptions::default())?;
//!     if let Some(root) = index.root() {
//!         for line in root.dump_tree()? {
//!             println!("{}", line);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod io;

// Re-export commonly used types
pub use config::{Cli, Command};
pub use error::{BuildError, ExifError, IoError};
pub use format::exif::{
    collect, encode_to_blob, visit, Builder, BuilderTag, BuilderValue, ByteOrder, Directory,
    DirectoryIdentity, DirectoryIndex, DirectoryKind, DirectoryNode, Encoder, Entry, ExifHeader,
    GpsDegrees, GpsInfo, Rational, ScanOptions, ScanSummary, SignedRational, TagDefinition,
    TagRecord, TagRegistry, TagType, TagValue,
};
pub use format::{
    is_exif_header, locate, search_and_extract, search_and_extract_nth, search_file_and_extract,
    search_file_and_extract_nth,
};
pub use io::{ByteSource, MemorySource, SharedSource, SourceCursor};
