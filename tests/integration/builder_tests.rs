//! Builders assembled from scratch or from decoded blobs.
//!
//! Tests verify:
//! - A tree built tag by tag encodes to a blob that decodes to the same values
//! - Typed values are stored with the types the registry allows
//! - Seeding from a decoded directory honours include and exclude lists
//! - Invalid trees are rejected before encoding

use exif_codec::format::exif::{UndefinedValue, UserCommentEncoding};
use exif_codec::{
    collect, encode_to_blob, BuildError, Builder, ByteOrder, DirectoryIdentity, DirectoryIndex,
    ExifError, Rational, ScanOptions, TagRegistry, TagValue,
};

use super::test_utils::{
    sample_blob, TAG_EXPOSURE_TIME, TAG_MAKE, TAG_ORIENTATION, TAG_X_RESOLUTION, THUMBNAIL,
};

fn decode(blob: Vec<u8>) -> DirectoryIndex {
    let (_, index) = collect(blob, TagRegistry::standard(), ScanOptions::default()).unwrap();
    index
}

fn first_value(index: &DirectoryIndex, path: &str, name: &str) -> TagValue {
    index.resolve_path(path).unwrap().find_tag_with_name(name).unwrap()[0]
        .value()
        .unwrap()
}

/// IFD0 { Make, Orientation, Exif { ExposureTime, UserComment }, GPSInfo { ... } } -> IFD1 { thumbnail }
fn camera_builder(order: ByteOrder) -> Builder {
    let mut root = Builder::new_root(order);
    root.add_standard_with_name("Make", "Nikon").unwrap();
    root.add_standard(TAG_ORIENTATION, 6u16).unwrap();

    let exif = root.get_or_create("IFD/Exif").unwrap();
    exif.add_standard(TAG_EXPOSURE_TIME, Rational::new(1, 60)).unwrap();
    exif.add_standard_with_name(
        "UserComment",
        UndefinedValue::UserComment {
            encoding: UserCommentEncoding::Ascii,
            payload: b"hello".to_vec(),
        },
    )
    .unwrap();

    let gps = root.get_or_create("IFD/GPSInfo").unwrap();
    gps.add_standard_with_name("GPSVersionID", vec![2u8, 3, 0, 0]).unwrap();
    gps.add_standard_with_name("GPSLatitudeRef", "S").unwrap();
    gps.add_standard_with_name(
        "GPSLatitude",
        vec![Rational::new(33, 1), Rational::new(52, 1), Rational::new(0, 1)],
    )
    .unwrap();
    gps.add_standard_with_name("GPSLongitudeRef", "E").unwrap();
    gps.add_standard_with_name(
        "GPSLongitude",
        vec![Rational::new(151, 1), Rational::new(12, 1), Rational::new(36, 1)],
    )
    .unwrap();
    gps.add_standard_with_name("GPSAltitudeRef", vec![1u8]).unwrap();
    gps.add_standard_with_name("GPSAltitude", Rational::new(3, 2)).unwrap();
    gps.add_standard_with_name(
        "GPSTimeStamp",
        vec![Rational::new(23, 1), Rational::new(59, 1), Rational::new(30, 1)],
    )
    .unwrap();
    gps.add_standard_with_name("GPSDateStamp", "2024:02:29").unwrap();

    root.get_or_create("IFD1")
        .unwrap()
        .set_thumbnail(THUMBNAIL.to_vec())
        .unwrap();
    root
}

// =============================================================================
// Building from scratch
// =============================================================================

#[test]
fn test_built_tree_shape() {
    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        let index = decode(encode_to_blob(&camera_builder(order)).unwrap());

        assert_eq!(index.byte_order(), order);
        let mut paths: Vec<String> = index.directories().map(|n| n.identity().to_string()).collect();
        paths.sort();
        assert_eq!(paths, vec!["IFD", "IFD/Exif", "IFD/GPSInfo", "IFD1"]);
        assert!(index.unknown_tags().is_empty());
    }
}

#[test]
fn test_built_values() {
    let index = decode(encode_to_blob(&camera_builder(ByteOrder::BigEndian)).unwrap());

    assert_eq!(
        first_value(&index, "IFD", "Make"),
        TagValue::Ascii("Nikon".to_string())
    );
    assert_eq!(
        first_value(&index, "IFD", "Orientation"),
        TagValue::Shorts(vec![6])
    );
    assert_eq!(
        first_value(&index, "IFD/Exif", "ExposureTime"),
        TagValue::Rationals(vec![Rational::new(1, 60)])
    );
    assert_eq!(
        first_value(&index, "IFD/Exif", "UserComment"),
        TagValue::Undefined(UndefinedValue::UserComment {
            encoding: UserCommentEncoding::Ascii,
            payload: b"hello".to_vec(),
        })
    );
}

#[test]
fn test_built_gps_and_thumbnail() {
    let index = decode(encode_to_blob(&camera_builder(ByteOrder::LittleEndian)).unwrap());

    let gps = index.gps_info().unwrap();
    assert!((gps.latitude.decimal() + 33.866_666).abs() < 1e-5);
    assert!((gps.longitude.decimal() - 151.21).abs() < 1e-5);
    assert_eq!(gps.altitude, Some(-1.5));
    assert_eq!(
        gps.timestamp.unwrap().to_rfc3339(),
        "2024-02-29T23:59:30+00:00"
    );

    assert_eq!(&index.thumbnail().unwrap()[..], &THUMBNAIL);
}

#[test]
fn test_short_widened_to_long() {
    let mut root = Builder::new_root(ByteOrder::LittleEndian);
    root.add_standard_with_name("ImageWidth", 640u16).unwrap();

    let index = decode(encode_to_blob(&root).unwrap());
    let entry = index.root().unwrap().find_tag_with_name("ImageWidth").unwrap()[0];
    assert_eq!(entry.tag_type().name(), "LONG");
    assert_eq!(entry.value().unwrap(), TagValue::Longs(vec![640]));
}

#[test]
fn test_edits_before_encoding() {
    let mut root = Builder::new_root(ByteOrder::BigEndian);
    root.add_standard(TAG_MAKE, "Canon").unwrap();
    root.add_standard(TAG_ORIENTATION, 1u16).unwrap();
    root.set_standard(TAG_MAKE, "Fujifilm").unwrap();
    root.delete_first(TAG_ORIENTATION).unwrap();

    let index = decode(encode_to_blob(&root).unwrap());
    let root = index.root().unwrap();
    assert_eq!(root.entries().len(), 1);
    assert_eq!(root.entries()[0].format().unwrap(), "Fujifilm");
}

#[test]
fn test_empty_root_encodes() {
    let blob = encode_to_blob(&Builder::new_root(ByteOrder::LittleEndian)).unwrap();

    // Header, zero count, zero next link
    assert_eq!(blob.len(), 8 + 2 + 4);
    let index = decode(blob);
    assert_eq!(index.len(), 1);
    assert!(index.root().unwrap().entries().is_empty());
}

// =============================================================================
// Seeding from decoded data
// =============================================================================

#[test]
fn test_include_list_keeps_named_tags() {
    let original = decode(sample_blob(ByteOrder::LittleEndian));
    let root = original.root().unwrap();

    let mut builder = Builder::new_with_existing(root, TagRegistry::standard());
    builder
        .add_tags_from_existing(root, Some(&[TAG_ORIENTATION, TAG_X_RESOLUTION][..]), None)
        .unwrap();

    let index = decode(encode_to_blob(&builder).unwrap());
    assert_eq!(index.len(), 1);
    let ids: Vec<u16> = index.root().unwrap().entries().iter().map(|e| e.tag_id()).collect();
    assert_eq!(ids, vec![TAG_ORIENTATION, TAG_X_RESOLUTION]);
}

#[test]
fn test_exclude_list_drops_child() {
    let original = decode(sample_blob(ByteOrder::BigEndian));
    let root = original.root().unwrap();

    let mut builder = Builder::new_with_existing(root, TagRegistry::standard());
    builder
        .add_tags_from_existing(root, None, Some(&[0x8825][..]))
        .unwrap();

    let index = decode(encode_to_blob(&builder).unwrap());
    let mut paths: Vec<String> = index.directories().map(|n| n.identity().to_string()).collect();
    paths.sort();
    assert_eq!(paths, vec!["IFD", "IFD/Exif", "IFD/Exif/Iop"]);
    assert!(matches!(index.gps_info(), Err(ExifError::NoGpsData)));
    assert!(matches!(index.thumbnail(), Err(ExifError::NoThumbnail)));
}

#[test]
fn test_seeded_builder_can_be_extended() {
    let original = decode(sample_blob(ByteOrder::LittleEndian));
    let mut builder =
        Builder::new_from_existing_chain(original.root().unwrap(), TagRegistry::standard()).unwrap();
    builder
        .get_or_create("IFD/Exif")
        .unwrap()
        .add_standard_with_name("PixelXDimension", 4000u32)
        .unwrap();
    builder.set_standard_with_name("Make", "Canon Inc.").unwrap();

    let index = decode(encode_to_blob(&builder).unwrap());
    assert_eq!(index.len(), original.len());
    assert_eq!(
        first_value(&index, "IFD/Exif", "PixelXDimension"),
        TagValue::Longs(vec![4000])
    );
    assert_eq!(
        first_value(&index, "IFD", "Make"),
        TagValue::Ascii("Canon Inc.".to_string())
    );
    assert_eq!(&index.thumbnail().unwrap()[..], &THUMBNAIL);
}

// =============================================================================
// Rejections
// =============================================================================

#[test]
fn test_thumbnail_only_on_ifd1() {
    let mut root = Builder::new_root(ByteOrder::LittleEndian);
    let result = root.set_thumbnail(THUMBNAIL.to_vec());
    assert!(matches!(result, Err(BuildError::ThumbnailNotAllowed { .. })));

    let ifd1 = root.get_or_create("IFD1").unwrap();
    assert!(matches!(
        ifd1.set_thumbnail(Vec::new()),
        Err(BuildError::EmptyThumbnail)
    ));
}

#[test]
fn test_child_checks() {
    let order = ByteOrder::LittleEndian;
    let mut root = Builder::new_root(order);
    root.get_or_create("IFD/Exif").unwrap();

    let exif = DirectoryIdentity::parse("IFD/Exif").unwrap();
    let duplicate = Builder::new(TagRegistry::standard(), exif, order);
    assert!(matches!(
        root.add_child(duplicate),
        Err(BuildError::DuplicateChild { .. })
    ));

    let iop = DirectoryIdentity::parse("IFD/Exif/Iop").unwrap();
    let misplaced = Builder::new(TagRegistry::standard(), iop, order);
    assert!(matches!(
        root.add_child(misplaced),
        Err(BuildError::NotAChild { .. })
    ));

    let gps = DirectoryIdentity::parse("IFD/GPSInfo").unwrap();
    let swapped = Builder::new(TagRegistry::standard(), gps, ByteOrder::BigEndian);
    assert!(matches!(
        root.add_child(swapped),
        Err(BuildError::ByteOrderMismatch { .. })
    ));
}

#[test]
fn test_registry_checks() {
    let mut root = Builder::new_root(ByteOrder::BigEndian);

    assert!(matches!(
        root.add_standard(TAG_MAKE, 5u16),
        Err(BuildError::Exif(ExifError::TagTypeNotSupported { .. }))
    ));
    assert!(matches!(
        root.add_standard_with_name("NoSuchTag", "x"),
        Err(BuildError::Exif(ExifError::TagNameNotFound { .. }))
    ));
    assert!(matches!(
        root.get_or_create("Exif"),
        Err(BuildError::Exif(ExifError::InvalidPath(_)))
    ));
    assert!(root.tags().is_empty());
}
