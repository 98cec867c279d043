//! Locating metadata inside files.
//!
//! Tests verify:
//! - Blobs are found behind container bytes (a JPEG APP1 segment here)
//! - The nth block can be selected when a file carries several
//! - Missing files and files without metadata produce distinct errors
//! - An extracted blob decodes and rewrites like an in-memory one

use std::io::Write;

use exif_codec::{
    collect, encode_to_blob, locate, search_file_and_extract, search_file_and_extract_nth,
    Builder, ByteOrder, ExifError, IoError, ScanOptions, TagRegistry,
};
use tempfile::NamedTempFile;

use super::test_utils::{sample_blob, wrap_in_jpeg, TAG_ORIENTATION, THUMBNAIL};

fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_extract_from_jpeg_file() {
    let blob = sample_blob(ByteOrder::LittleEndian);
    let file = write_temp(&wrap_in_jpeg(&blob));

    let extracted = search_file_and_extract(file.path()).unwrap();
    // Everything from the header on, including the trailing EOI marker
    assert_eq!(&extracted[..blob.len()], &blob[..]);
    assert_eq!(extracted.len(), blob.len() + 2);

    let (header, index) =
        collect(extracted, TagRegistry::standard(), ScanOptions::default()).unwrap();
    assert_eq!(header.byte_order, ByteOrder::LittleEndian);
    assert_eq!(index.len(), 5);
    assert_eq!(&index.thumbnail().unwrap()[..], &THUMBNAIL);
}

#[test]
fn test_locate_reports_position() {
    let jpeg = wrap_in_jpeg(&sample_blob(ByteOrder::BigEndian));
    let (position, header) = locate(&jpeg).unwrap();

    // SOI, APP1 marker, length, "Exif\0\0"
    assert_eq!(position, 2 + 2 + 2 + 6);
    assert_eq!(header.byte_order, ByteOrder::BigEndian);
    assert_eq!(header.first_ifd_offset, 8);
}

#[test]
fn test_nth_block_in_file() {
    let mut contents = wrap_in_jpeg(&sample_blob(ByteOrder::LittleEndian));
    contents.extend(wrap_in_jpeg(&sample_blob(ByteOrder::BigEndian)));
    let file = write_temp(&contents);

    let first = search_file_and_extract_nth(file.path(), 0).unwrap();
    let second = search_file_and_extract_nth(file.path(), 1).unwrap();
    assert_eq!(&first[..2], b"II");
    assert_eq!(&second[..2], b"MM");
    assert!(second.len() < first.len());

    let (_, index) = collect(second, TagRegistry::standard(), ScanOptions::default()).unwrap();
    assert_eq!(index.byte_order(), ByteOrder::BigEndian);
    assert_eq!(index.len(), 5);

    assert!(matches!(
        search_file_and_extract_nth(file.path(), 2),
        Err(ExifError::NoMetadata)
    ));
}

#[test]
fn test_file_without_metadata() {
    let file = write_temp(&[0xFF, 0xD8, 0xFF, 0xD9]);
    assert!(matches!(
        search_file_and_extract(file.path()),
        Err(ExifError::NoMetadata)
    ));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.jpg");

    match search_file_and_extract(&path) {
        Err(ExifError::Io(IoError::Read { identifier, .. })) => {
            assert!(identifier.ends_with("absent.jpg"));
        }
        other => panic!("expected a read error, got {other:?}"),
    }
}

// =============================================================================
// Rewrite
// =============================================================================

#[test]
fn test_strip_to_single_tag_and_reread() {
    let source = write_temp(&wrap_in_jpeg(&sample_blob(ByteOrder::LittleEndian)));
    let blob = search_file_and_extract(source.path()).unwrap();
    let (_, index) = collect(blob, TagRegistry::standard(), ScanOptions::default()).unwrap();
    let root = index.root().unwrap();

    let mut builder = Builder::new_with_existing(root, TagRegistry::standard());
    builder
        .add_tags_from_existing(root, Some(&[TAG_ORIENTATION][..]), None)
        .unwrap();
    let stripped = encode_to_blob(&builder).unwrap();

    let output = write_temp(&stripped);
    let reread = search_file_and_extract(output.path()).unwrap();
    assert_eq!(reread, stripped);

    let (_, index) = collect(reread, TagRegistry::standard(), ScanOptions::default()).unwrap();
    let root = index.root().unwrap();
    assert_eq!(root.entries().len(), 1);
    assert_eq!(root.entries()[0].format().unwrap(), "[1]");
    assert!(matches!(index.thumbnail(), Err(ExifError::NoThumbnail)));
}
