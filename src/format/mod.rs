//! Metadata format handling.
//!
//! - [`exif`] decodes, rebuilds and encodes EXIF/TIFF directory blobs.
//! - [`detect`] finds a blob inside container data such as a JPEG file.
//!
//! Container parsing itself is out of scope; the search works on raw bytes.

pub mod detect;
pub mod exif;

pub use detect::{
    is_exif_header, locate, search_and_extract, search_and_extract_nth, search_file_and_extract,
    search_file_and_extract_nth,
};
