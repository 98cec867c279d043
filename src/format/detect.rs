//! Locating a metadata blob inside arbitrary data.
//!
//! Containers (JPEG APP1 segments, raw TIFF files, PNG eXIf chunks) embed the
//! blob at different places. Rather than understanding each container, the
//! search probes every byte offset for a valid 8-byte header and returns the
//! data from the first match to the end. The blob length cannot be known
//! without decoding it, so the returned slice usually carries trailing image
//! data as well; the scanner only ever follows offsets and ignores the rest.

use std::path::Path;

use tracing::debug;

use crate::error::{ExifError, IoError};

use super::exif::header::{ExifHeader, EXIF_HEADER_SIZE, SIGNATURE_BIG_ENDIAN, SIGNATURE_LITTLE_ENDIAN};

/// Check whether `bytes` start with a metadata header.
///
/// Only the signature is inspected, so this is cheaper than
/// [`ExifHeader::parse`] for quick filtering.
pub fn is_exif_header(bytes: &[u8]) -> bool {
    if bytes.len() < EXIF_HEADER_SIZE {
        return false;
    }
    bytes[0..4] == SIGNATURE_LITTLE_ENDIAN || bytes[0..4] == SIGNATURE_BIG_ENDIAN
}

/// Find the first header in `data`.
///
/// Returns the absolute position of the header and the parsed header.
///
/// # Errors
/// - `NoMetadata` if no offset holds a valid header
pub fn locate(data: &[u8]) -> Result<(usize, ExifHeader), ExifError> {
    locate_from(data, 0)
}

fn locate_from(data: &[u8], start: usize) -> Result<(usize, ExifHeader), ExifError> {
    let last = match data.len().checked_sub(EXIF_HEADER_SIZE) {
        Some(last) => last,
        None => return Err(ExifError::NoMetadata),
    };

    for position in start..=last {
        match ExifHeader::parse(&data[position..]) {
            Ok(header) => {
                debug!(position, byte_order = header.byte_order.name(), "Found metadata header");
                return Ok((position, header));
            }
            Err(e) if e.is_header_invalid() => continue,
            Err(e) => return Err(e),
        }
    }

    Err(ExifError::NoMetadata)
}

/// Return the data from the first header to the end of `data`.
///
/// # Errors
/// - `NoMetadata` if no header is present
pub fn search_and_extract(data: &[u8]) -> Result<&[u8], ExifError> {
    let (position, _) = locate(data)?;
    Ok(&data[position..])
}

/// Like [`search_and_extract`], but skip the first `n` headers found.
///
/// Each skipped match resumes the search one byte past it, so overlapping
/// candidates are all counted. Useful for files that carry several blocks.
///
/// # Errors
/// - `NoMetadata` if fewer than `n + 1` headers are present
pub fn search_and_extract_nth(data: &[u8], n: usize) -> Result<&[u8], ExifError> {
    let mut start = 0;
    let mut skipped = 0;
    loop {
        let (position, _) = locate_from(data, start)?;
        if skipped == n {
            debug!(n, position, "Reached requested metadata block");
            return Ok(&data[position..]);
        }
        debug!(skipped, position, "Skipping metadata block");
        skipped += 1;
        start = position + 1;
    }
}

/// Read a file and return its contents from the first header onward.
///
/// # Errors
/// - `Io` if the file cannot be read
/// - `NoMetadata` if no header is present
pub fn search_file_and_extract(path: impl AsRef<Path>) -> Result<Vec<u8>, ExifError> {
    search_file_and_extract_nth(path, 0)
}

/// File variant of [`search_and_extract_nth`].
pub fn search_file_and_extract_nth(path: impl AsRef<Path>, n: usize) -> Result<Vec<u8>, ExifError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| IoError::Read {
        identifier: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(search_and_extract_nth(&data, n)?.to_vec())
}
