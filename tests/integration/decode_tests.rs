//! Decoding integration tests.
//!
//! Tests verify:
//! - Every directory kind is found and linked in both byte orders
//! - Values, GPS information and thumbnails decode from hand-built blobs
//! - Unknown tags, bad types and cycles are tolerated
//! - Structural damage is reported

use exif_codec::format::exif::UndefinedValue;
use exif_codec::{
    collect, visit, ByteOrder, DirectoryIndex, DirectoryKind, Entry, ExifError, Rational,
    ScanOptions, TagRegistry, TagValue,
};

use super::test_utils::{
    sample_blob, single_directory_blob, BlobWriter, RawEntry, TAG_EXIF_VERSION,
    TAG_EXPOSURE_TIME, TAG_INTEROP_INDEX, TAG_INTEROP_VERSION, TAG_MAKE, TAG_ORIENTATION,
    TAG_PIXEL_X_DIMENSION, TAG_X_RESOLUTION, THUMBNAIL, TYPE_ASCII, TYPE_SHORT,
};

const ORDERS: [ByteOrder; 2] = [ByteOrder::LittleEndian, ByteOrder::BigEndian];

fn decode(blob: Vec<u8>) -> DirectoryIndex {
    decode_with(blob, ScanOptions::default())
}

fn decode_with(blob: Vec<u8>, options: ScanOptions) -> DirectoryIndex {
    let (_, index) = collect(blob, TagRegistry::standard(), options).unwrap();
    index
}

// =============================================================================
// Structure
// =============================================================================

#[test]
fn test_sample_directory_graph() {
    for order in ORDERS {
        let (header, index) =
            collect(sample_blob(order), TagRegistry::standard(), ScanOptions::default()).unwrap();
        assert_eq!(header.byte_order, order);
        assert_eq!(header.first_ifd_offset, 8);
        assert_eq!(index.len(), 5);

        for path in ["IFD", "IFD/Exif", "IFD/Exif/Iop", "IFD/GPSInfo", "IFD1"] {
            assert!(index.lookup(path).is_some(), "{path} missing for {order:?}");
        }

        let root = index.root().unwrap();
        assert_eq!(root.offset(), 8);
        assert_eq!(root.entries().len(), 5);
        assert_eq!(root.children().count(), 2);

        let ifd1 = root.next_sibling().unwrap();
        assert_eq!(ifd1.identity().to_string(), "IFD1");
        assert!(ifd1.next_sibling().is_none());

        let exif = root.child_with_kind(DirectoryKind::Exif).unwrap();
        let iop = exif.child_with_kind(DirectoryKind::Interop).unwrap();
        assert_eq!(iop.identity().to_string(), "IFD/Exif/Iop");
        assert_eq!(iop.parent().unwrap().identity(), exif.identity());
        assert_eq!(exif.parent().unwrap().identity(), root.identity());
        assert!(matches!(
            root.child_with_kind(DirectoryKind::Interop),
            Err(ExifError::DirectoryNotFound(_))
        ));
    }
}

#[test]
fn test_resolve_path() {
    let index = decode(sample_blob(ByteOrder::LittleEndian));

    let iop = index.resolve_path("IFD/Exif/Iop").unwrap();
    assert_eq!(iop.kind(), DirectoryKind::Interop);

    let ifd1 = index.resolve_path("IFD1").unwrap();
    assert_eq!(ifd1.identity().index(), 1);

    assert!(matches!(index.resolve_path("Exif"), Err(ExifError::InvalidPath(_))));
    assert!(matches!(index.resolve_path("IFD/Bogus"), Err(ExifError::InvalidPath(_))));
    assert!(matches!(
        index.resolve_path("IFD2"),
        Err(ExifError::DirectoryNotFound(_))
    ));
    assert!(matches!(
        index.resolve_path("IFD1/Exif"),
        Err(ExifError::DirectoryNotFound(_))
    ));
}

#[test]
fn test_furthest_offset_covers_blob() {
    let blob = sample_blob(ByteOrder::BigEndian);
    let len = blob.len() as u64;
    let index = decode(blob);
    assert_eq!(index.furthest_offset(), len);
}

// =============================================================================
// Values
// =============================================================================

#[test]
fn test_sample_values() {
    for order in ORDERS {
        let index = decode(sample_blob(order));
        let root = index.root().unwrap();

        let make = root.find_tag_with_id(TAG_MAKE).unwrap();
        assert_eq!(make.len(), 1);
        assert_eq!(make[0].tag_name(), "Make");
        assert_eq!(make[0].format().unwrap(), "Canon");

        let orientation = root.find_tag_with_id(TAG_ORIENTATION).unwrap()[0];
        assert!(orientation.is_inline());
        assert_eq!(orientation.format().unwrap(), "[1]");
        assert_eq!(orientation.format_first().unwrap(), "1");

        let resolution = root.find_tag_with_name("XResolution").unwrap()[0];
        assert_eq!(resolution.tag_id(), TAG_X_RESOLUTION);
        assert_eq!(
            resolution.value().unwrap(),
            TagValue::Rationals(vec![Rational::new(72, 1)])
        );

        let exif = index.lookup("IFD/Exif").unwrap();
        let exposure = exif.find_tag_with_id(TAG_EXPOSURE_TIME).unwrap()[0];
        assert_eq!(exposure.format().unwrap(), "[1/125]");
        let version = exif.find_tag_with_id(TAG_EXIF_VERSION).unwrap()[0];
        assert_eq!(
            version.value().unwrap(),
            TagValue::Undefined(UndefinedValue::Text(b"0230".to_vec()))
        );

        let iop = index.lookup("IFD/Exif/Iop").unwrap();
        assert_eq!(
            iop.find_tag_with_id(TAG_INTEROP_INDEX).unwrap()[0].format().unwrap(),
            "R98"
        );
        assert_eq!(
            iop.find_tag_with_id(TAG_INTEROP_VERSION).unwrap()[0].format().unwrap(),
            "0100"
        );
    }
}

#[test]
fn test_missing_tag_lookup() {
    let index = decode(sample_blob(ByteOrder::LittleEndian));
    let root = index.root().unwrap();
    assert!(matches!(
        root.find_tag_with_id(0x0110),
        Err(ExifError::TagNotFound { .. })
    ));
    assert!(matches!(
        root.find_tag_with_name("NotATag"),
        Err(ExifError::TagNameNotFound { .. })
    ));
}

#[test]
fn test_dump_tags_order() {
    let index = decode(sample_blob(ByteOrder::LittleEndian));
    let ids: Vec<u16> = index
        .root()
        .unwrap()
        .dump_tags()
        .unwrap()
        .iter()
        .map(|e| e.tag_id())
        .collect();

    assert_eq!(
        ids,
        vec![
            0x010f, 0x0112, 0x011a, 0x8769, // IFD0 up to the Exif pointer
            0x829a, 0x9000, 0xa005, // Exif
            0x0001, 0x0002, // Iop
            0x8825, // GPS pointer
            0x0000, 0x0001, 0x0002, 0x0003, 0x0004, 0x0005, 0x0006, 0x0007, 0x001d, // GPS
            0x0103, 0x0201, 0x0202, // IFD1
        ]
    );
}

#[test]
fn test_dump_tree() {
    let index = decode(sample_blob(ByteOrder::LittleEndian));
    let lines = index.root().unwrap().dump_tree().unwrap();

    assert_eq!(lines[0], "> IFD [ROOT]->[IFD]:(0) TOP");
    assert_eq!(lines[1], "  - (0x010f)");
    assert!(lines.contains(&"  > IFD [IFD]->[IFD/Exif]:(0) TOP".to_string()));
    assert!(lines.contains(&"    > IFD [IFD/Exif]->[IFD/Exif/Iop]:(0) TOP".to_string()));
    assert!(lines.contains(&"  < IFD [IFD]->[IFD/GPSInfo]:(0) BOTTOM".to_string()));
    assert_eq!(
        lines[lines.len() - 7..].to_vec(),
        vec![
            "< IFD [ROOT]->[IFD]:(0) BOTTOM",
            "* LINKING TO SIBLING IFD [IFD]:(1)",
            "> IFD [ROOT]->[IFD]:(1) TOP",
            "  - (0x0103)",
            "  - (0x0201)",
            "  - (0x0202)",
            "< IFD [ROOT]->[IFD]:(1) BOTTOM",
        ]
    );
}

#[test]
fn test_enumerate_skips_pointers() {
    let index = decode(sample_blob(ByteOrder::BigEndian));
    let mut seen = Vec::new();
    index
        .root()
        .unwrap()
        .enumerate_tags_recursively(&mut |node, entry: &Entry| {
            seen.push((node.identity().to_string(), entry.tag_id()));
            Ok(())
        })
        .unwrap();

    assert_eq!(seen.len(), 19);
    assert!(!seen.iter().any(|(_, id)| [0x8769, 0x8825, 0xa005].contains(id)));
    assert_eq!(seen[0], ("IFD".to_string(), TAG_MAKE));
    assert_eq!(seen[3], ("IFD/Exif".to_string(), TAG_EXPOSURE_TIME));
    assert_eq!(seen[18], ("IFD1".to_string(), 0x0202));
}

#[test]
fn test_tag_records_json() {
    let index = decode(sample_blob(ByteOrder::LittleEndian));
    let records = index.root().unwrap().tag_records().unwrap();
    assert_eq!(records.len(), 22);

    let json = serde_json::to_value(&records).unwrap();
    assert_eq!(json[0]["path"], "IFD");
    assert_eq!(json[0]["tag_name"], "Make");
    assert_eq!(json[0]["tag_type"], "ASCII");
    assert_eq!(json[0]["value"], "Canon");
    assert_eq!(json[4]["path"], "IFD/Exif");
    assert_eq!(json[4]["value"], "[1/125]");
}

// =============================================================================
// GPS and thumbnail
// =============================================================================

#[test]
fn test_gps_info() {
    for order in ORDERS {
        let index = decode(sample_blob(order));
        let gps = index.gps_info().unwrap();

        assert_eq!(gps.latitude.orientation, 'N');
        assert!((gps.latitude.decimal() - 26.58675).abs() < 1e-6);
        assert_eq!(gps.longitude.orientation, 'W');
        assert!((gps.longitude.decimal() + 80.053611).abs() < 1e-6);
        assert_eq!(gps.altitude, Some(5.0));

        let timestamp = gps.timestamp.unwrap();
        assert_eq!(timestamp.to_rfc3339(), "2018-04-29T01:22:57+00:00");
    }
}

#[test]
fn test_gps_on_wrong_directory() {
    let index = decode(sample_blob(ByteOrder::LittleEndian));
    assert!(matches!(
        index.root().unwrap().gps_info(),
        Err(ExifError::WrongDirectoryKind { .. })
    ));
}

#[test]
fn test_gps_absent() {
    let blob = single_directory_blob(
        ByteOrder::LittleEndian,
        &[RawEntry::short(ByteOrder::LittleEndian, TAG_ORIENTATION, 1)],
    );
    let index = decode(blob);
    assert!(matches!(index.gps_info(), Err(ExifError::NoGpsData)));
    assert!(matches!(index.thumbnail(), Err(ExifError::NoThumbnail)));
}

#[test]
fn test_thumbnail() {
    for order in ORDERS {
        let index = decode(sample_blob(order));
        assert_eq!(&index.thumbnail().unwrap()[..], &THUMBNAIL);
        assert!(matches!(
            index.root().unwrap().thumbnail(),
            Err(ExifError::NoThumbnail)
        ));
    }
}

// =============================================================================
// Tolerated damage
// =============================================================================

#[test]
fn test_unregistered_tag_is_skipped() {
    let order = ByteOrder::LittleEndian;
    let blob = single_directory_blob(
        order,
        &[
            RawEntry::short(order, TAG_ORIENTATION, 6),
            RawEntry::short(order, 0xfeed, 1),
        ],
    );
    let index = decode(blob);
    let root = index.root().unwrap();
    assert_eq!(root.entries().len(), 1);
    assert_eq!(root.entries()[0].tag_id(), TAG_ORIENTATION);
    assert!(index.unknown_tags().is_empty());
}

#[test]
fn test_invalid_type_is_skipped() {
    let order = ByteOrder::BigEndian;
    let blob = single_directory_blob(
        order,
        &[
            RawEntry::new(TAG_MAKE, 99, 1, vec![0x41]),
            RawEntry::short(order, TAG_ORIENTATION, 3),
        ],
    );
    let index = decode(blob);
    let root = index.root().unwrap();
    assert_eq!(root.entries().len(), 1);
    assert_eq!(root.entries()[0].tag_id(), TAG_ORIENTATION);
}

#[test]
fn test_unsupported_type() {
    let order = ByteOrder::LittleEndian;
    // Orientation is registered as SHORT only
    let entries = [RawEntry::long(order, TAG_ORIENTATION, 1)];

    let index = decode(single_directory_blob(order, &entries));
    assert!(index.root().unwrap().entries().is_empty());

    let index = decode_with(
        single_directory_blob(order, &entries),
        ScanOptions {
            universal_search: true,
        },
    );
    let root = index.root().unwrap();
    assert_eq!(root.entries().len(), 1);
    assert_eq!(root.entries()[0].tag_type().name(), "LONG");
}

#[test]
fn test_universal_search_recovers_misplaced_tag() {
    let order = ByteOrder::LittleEndian;
    let entries = [
        RawEntry::short(order, TAG_ORIENTATION, 1),
        // PixelXDimension belongs in the Exif directory
        RawEntry::long(order, TAG_PIXEL_X_DIMENSION, 640),
    ];

    let index = decode(single_directory_blob(order, &entries));
    assert_eq!(index.root().unwrap().entries().len(), 1);

    let index = decode_with(
        single_directory_blob(order, &entries),
        ScanOptions {
            universal_search: true,
        },
    );
    let root = index.root().unwrap();
    assert_eq!(root.entries().len(), 2);
    assert_eq!(root.entries()[1].tag_name(), "PixelXDimension");
    assert_eq!(root.entries()[1].format().unwrap(), "[640]");

    let unknown = index.unknown_tags();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].path, "IFD");
    assert_eq!(unknown[0].tag_id, TAG_PIXEL_X_DIMENSION);
    assert_eq!(unknown[0].matched_path.as_deref(), Some("IFD/Exif"));
}

#[test]
fn test_self_linked_directory_terminates() {
    let order = ByteOrder::BigEndian;
    let mut writer = BlobWriter::new(order);
    writer.directory(
        "ifd0",
        &[RawEntry::short(order, TAG_ORIENTATION, 1)],
        Some("ifd0"),
    );
    let index = decode(writer.finish());

    assert_eq!(index.len(), 1);
    let root = index.root().unwrap();
    assert_eq!(root.next_offset(), 0);
    assert!(root.next_sibling().is_none());
}

#[test]
fn test_two_directory_cycle_terminates() {
    let order = ByteOrder::LittleEndian;
    let mut writer = BlobWriter::new(order);
    writer.directory("ifd0", &[RawEntry::short(order, TAG_ORIENTATION, 1)], Some("ifd1"));
    writer.directory("ifd1", &[RawEntry::short(order, 0x0103, 6)], Some("ifd0"));
    let index = decode(writer.finish());

    assert_eq!(index.len(), 2);
    let ifd1 = index.root().unwrap().next_sibling().unwrap();
    assert_eq!(ifd1.identity().to_string(), "IFD1");
    assert!(ifd1.next_sibling().is_none());
}

// =============================================================================
// Structural errors
// =============================================================================

#[test]
fn test_truncated_header() {
    let result = collect(
        vec![0x49, 0x49, 0x2A, 0x00, 0x08, 0x00],
        TagRegistry::standard(),
        ScanOptions::default(),
    );
    match result {
        Err(err @ ExifError::HeaderTooShort { actual: 6 }) => assert!(err.is_header_invalid()),
        other => panic!("unexpected result {:?}", other.map(|(h, _)| h)),
    }
}

#[test]
fn test_bad_signature() {
    let result = collect(
        b"GIF89a\0\0\0\0".to_vec(),
        TagRegistry::standard(),
        ScanOptions::default(),
    );
    assert!(matches!(result, Err(ExifError::InvalidSignature(_))));
}

#[test]
fn test_first_directory_out_of_bounds() {
    let mut writer = BlobWriter::new(ByteOrder::LittleEndian);
    writer.set_first_offset(1000);
    let blob = writer.finish();

    let result = collect(blob.clone(), TagRegistry::standard(), ScanOptions::default());
    assert!(matches!(result, Err(ExifError::OffsetInvalid { offset: 1000, .. })));

    // A visiting scan logs the unreachable directory and stops.
    let mut ignore = |_: &Entry| -> Result<(), ExifError> { Ok(()) };
    let summary = visit(blob, TagRegistry::standard(), ScanOptions::default(), &mut ignore).unwrap();
    assert_eq!(summary.header.first_ifd_offset, 1000);
}

#[test]
fn test_far_value_out_of_bounds() {
    let order = ByteOrder::LittleEndian;
    let mut blob = single_directory_blob(order, &[RawEntry::ascii(TAG_MAKE, "Canon EOS")]);
    // Drop the far value but keep the table intact
    blob.truncate(blob.len() - 10);

    let index = decode(blob);
    let root = index.root().unwrap();
    let make = &root.entries()[0];
    assert!(!make.is_inline());
    assert!(matches!(make.value(), Err(ExifError::OffsetInvalid { .. })));

    let records = root.tag_records().unwrap();
    assert_eq!(records[0].value, "!MALFORMED");
}

#[test]
fn test_inline_multi_unit_values() {
    let order = ByteOrder::LittleEndian;
    // Four ASCII units fill the value field exactly
    let blob = single_directory_blob(
        order,
        &[RawEntry::new(TAG_MAKE, TYPE_ASCII, 4, b"Nik\0".to_vec())],
    );
    let index = decode(blob);
    assert_eq!(index.root().unwrap().entries()[0].format().unwrap(), "Nik");

    // A SHORT with two units fits inline as well
    let mut bytes = Vec::new();
    order.put_u16(&mut bytes, 8);
    order.put_u16(&mut bytes, 8);
    let blob = single_directory_blob(order, &[RawEntry::new(0x0102, TYPE_SHORT, 2, bytes)]);
    let index = decode(blob);
    let root = index.root().unwrap();
    let entry = &root.entries()[0];
    assert!(entry.is_inline());
    assert_eq!(entry.format().unwrap(), "[8 8]");
    assert_eq!(entry.format_first().unwrap(), "8...");
}

// =============================================================================
// Visiting scan
// =============================================================================

#[test]
fn test_visit_reports_every_entry() {
    let blob = sample_blob(ByteOrder::BigEndian);
    let len = blob.len() as u64;

    let mut paths = Vec::new();
    let mut visitor = |entry: &Entry| -> Result<(), ExifError> {
        paths.push(entry.identity().to_string());
        Ok(())
    };
    let summary = visit(blob, TagRegistry::standard(), ScanOptions::default(), &mut visitor).unwrap();

    assert_eq!(summary.header.byte_order, ByteOrder::BigEndian);
    assert_eq!(summary.furthest_offset, len);
    assert!(summary.unknown_tags.is_empty());
    assert_eq!(paths.len(), 22);
    assert_eq!(paths.iter().filter(|p| *p == "IFD/GPSInfo").count(), 9);
    assert_eq!(paths.iter().filter(|p| *p == "IFD1").count(), 3);
}

#[test]
fn test_visitor_error_aborts_scan() {
    let mut calls = 0;
    let mut visitor = |_: &Entry| -> Result<(), ExifError> {
        calls += 1;
        Err(ExifError::NoMetadata)
    };
    let result = visit(
        sample_blob(ByteOrder::LittleEndian),
        TagRegistry::standard(),
        ScanOptions::default(),
        &mut visitor,
    );
    assert!(matches!(result, Err(ExifError::NoMetadata)));
    assert_eq!(calls, 1);
}

#[test]
fn test_pointer_type_is_long() {
    let index = decode(sample_blob(ByteOrder::LittleEndian));
    let root = index.root().unwrap();
    let pointer = root.find_tag_with_id(0x8769).unwrap()[0];
    assert!(pointer.is_child_pointer());
    assert_eq!(pointer.tag_type().name(), "LONG");
    assert_eq!(
        pointer.value_offset(),
        index.lookup("IFD/Exif").unwrap().offset()
    );
}
