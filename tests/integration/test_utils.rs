//! Test utilities for integration tests.
//!
//! Blobs are assembled by hand so the decoder is checked against bytes it did
//! not produce itself. [`BlobWriter`] lays out directories and their far
//! values in order and patches label references once every position is known.

use std::collections::HashMap;

use exif_codec::ByteOrder;

// =============================================================================
// Raw entries
// =============================================================================

pub const TYPE_BYTE: u16 = 1;
pub const TYPE_ASCII: u16 = 2;
pub const TYPE_SHORT: u16 = 3;
pub const TYPE_LONG: u16 = 4;
pub const TYPE_RATIONAL: u16 = 5;
pub const TYPE_UNDEFINED: u16 = 7;

/// Value of a raw entry.
#[derive(Debug, Clone)]
pub enum RawValue {
    /// Encoded bytes; inline when four bytes or fewer
    Bytes(Vec<u8>),
    /// LONG offset of a labelled directory or data block
    Link(&'static str),
}

/// One 12-byte directory entry before layout.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub tag_id: u16,
    pub tag_type: u16,
    pub count: u32,
    pub value: RawValue,
}

impl RawEntry {
    pub fn new(tag_id: u16, tag_type: u16, count: u32, bytes: Vec<u8>) -> Self {
        Self {
            tag_id,
            tag_type,
            count,
            value: RawValue::Bytes(bytes),
        }
    }

    /// NUL-terminated ASCII.
    pub fn ascii(tag_id: u16, text: &str) -> Self {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        Self::new(tag_id, TYPE_ASCII, bytes.len() as u32, bytes)
    }

    pub fn bytes(tag_id: u16, bytes: &[u8]) -> Self {
        Self::new(tag_id, TYPE_BYTE, bytes.len() as u32, bytes.to_vec())
    }

    pub fn undefined(tag_id: u16, bytes: &[u8]) -> Self {
        Self::new(tag_id, TYPE_UNDEFINED, bytes.len() as u32, bytes.to_vec())
    }

    pub fn short(order: ByteOrder, tag_id: u16, value: u16) -> Self {
        let mut bytes = Vec::new();
        order.put_u16(&mut bytes, value);
        Self::new(tag_id, TYPE_SHORT, 1, bytes)
    }

    pub fn long(order: ByteOrder, tag_id: u16, value: u32) -> Self {
        let mut bytes = Vec::new();
        order.put_u32(&mut bytes, value);
        Self::new(tag_id, TYPE_LONG, 1, bytes)
    }

    pub fn rationals(order: ByteOrder, tag_id: u16, values: &[(u32, u32)]) -> Self {
        let mut bytes = Vec::new();
        for (numerator, denominator) in values {
            order.put_u32(&mut bytes, *numerator);
            order.put_u32(&mut bytes, *denominator);
        }
        Self::new(tag_id, TYPE_RATIONAL, values.len() as u32, bytes)
    }

    /// A LONG pointing at a labelled position.
    pub fn link(tag_id: u16, label: &'static str) -> Self {
        Self {
            tag_id,
            tag_type: TYPE_LONG,
            count: 1,
            value: RawValue::Link(label),
        }
    }
}

// =============================================================================
// BlobWriter
// =============================================================================

/// Sequential blob assembler.
///
/// Every directory is written as its table followed by its far values.
/// References to labels are patched in [`BlobWriter::finish`].
pub struct BlobWriter {
    order: ByteOrder,
    buf: Vec<u8>,
    labels: HashMap<&'static str, u32>,
    patches: Vec<(usize, &'static str)>,
}

impl BlobWriter {
    /// Start a blob whose header points at offset 8.
    pub fn new(order: ByteOrder) -> Self {
        let mut buf = order.signature().to_vec();
        order.put_u32(&mut buf, 8);
        Self {
            order,
            buf,
            labels: HashMap::new(),
            patches: Vec::new(),
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn position(&self) -> u32 {
        self.buf.len() as u32
    }

    /// Overwrite the header's first-directory offset.
    pub fn set_first_offset(&mut self, offset: u32) {
        let mut field = Vec::new();
        self.order.put_u32(&mut field, offset);
        self.buf[4..8].copy_from_slice(&field);
    }

    /// Append raw bytes under `label`.
    pub fn data(&mut self, label: &'static str, bytes: &[u8]) -> u32 {
        let position = self.position();
        self.labels.insert(label, position);
        self.buf.extend_from_slice(bytes);
        position
    }

    /// Append a directory under `label`, followed by its far values.
    ///
    /// `next` names the sibling the directory links to, if any.
    pub fn directory(
        &mut self,
        label: &'static str,
        entries: &[RawEntry],
        next: Option<&'static str>,
    ) -> u32 {
        let start = self.position();
        self.labels.insert(label, start);

        let table_len = 2 + entries.len() * 12 + 4;
        let mut far_offset = start as usize + table_len;
        let mut far_data = Vec::new();

        self.order.put_u16(&mut self.buf, entries.len() as u16);
        for entry in entries {
            self.order.put_u16(&mut self.buf, entry.tag_id);
            self.order.put_u16(&mut self.buf, entry.tag_type);
            self.order.put_u32(&mut self.buf, entry.count);

            match &entry.value {
                RawValue::Link(target) => {
                    self.patches.push((self.buf.len(), *target));
                    self.buf.extend_from_slice(&[0; 4]);
                }
                RawValue::Bytes(bytes) if bytes.len() <= 4 => {
                    let mut field = [0u8; 4];
                    field[..bytes.len()].copy_from_slice(bytes);
                    self.buf.extend_from_slice(&field);
                }
                RawValue::Bytes(bytes) => {
                    self.order.put_u32(&mut self.buf, far_offset as u32);
                    far_data.extend_from_slice(bytes);
                    far_offset += bytes.len();
                }
            }
        }

        match next {
            Some(target) => {
                self.patches.push((self.buf.len(), target));
                self.buf.extend_from_slice(&[0; 4]);
            }
            None => self.order.put_u32(&mut self.buf, 0),
        }

        self.buf.extend_from_slice(&far_data);
        start
    }

    /// Resolve every label reference and return the blob.
    ///
    /// Panics on a reference to a label that was never written.
    pub fn finish(mut self) -> Vec<u8> {
        for (at, label) in std::mem::take(&mut self.patches) {
            let target = *self
                .labels
                .get(label)
                .unwrap_or_else(|| panic!("unknown label {label}"));
            let mut field = Vec::new();
            self.order.put_u32(&mut field, target);
            self.buf[at..at + 4].copy_from_slice(&field);
        }
        self.buf
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// JPEG-like thumbnail bytes (SOI ... EOI).
pub const THUMBNAIL: [u8; 8] = [0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x43, 0xFF, 0xD9];

pub const TAG_MAKE: u16 = 0x010f;
pub const TAG_ORIENTATION: u16 = 0x0112;
pub const TAG_X_RESOLUTION: u16 = 0x011a;
pub const TAG_COMPRESSION: u16 = 0x0103;
pub const TAG_EXPOSURE_TIME: u16 = 0x829a;
pub const TAG_EXIF_VERSION: u16 = 0x9000;
pub const TAG_PIXEL_X_DIMENSION: u16 = 0xa002;
pub const TAG_INTEROP_INDEX: u16 = 0x0001;
pub const TAG_INTEROP_VERSION: u16 = 0x0002;

/// A camera-style blob with every directory kind.
///
/// ```text
/// IFD0  { Make="Canon", Orientation=1, XResolution=72/1, ExifTag, GPSTag } -> IFD1
///   Exif    { ExposureTime=1/125, ExifVersion="0230", InteroperabilityTag }
///     Iop   { InteroperabilityIndex="R98", InteroperabilityVersion="0100" }
///   GPSInfo { version 2.2, 26°35'12.3"N, 80°3'13"W, 5 m, 2018-04-29 01:22:57 }
/// IFD1  { Compression=6, JPEGInterchangeFormat, JPEGInterchangeFormatLength=8 }
/// thumbnail (8 bytes)
/// ```
pub fn sample_blob(order: ByteOrder) -> Vec<u8> {
    let mut writer = BlobWriter::new(order);

    writer.directory(
        "ifd0",
        &[
            RawEntry::ascii(TAG_MAKE, "Canon"),
            RawEntry::short(order, TAG_ORIENTATION, 1),
            RawEntry::rationals(order, TAG_X_RESOLUTION, &[(72, 1)]),
            RawEntry::link(0x8769, "exif"),
            RawEntry::link(0x8825, "gps"),
        ],
        Some("ifd1"),
    );

    writer.directory(
        "exif",
        &[
            RawEntry::rationals(order, TAG_EXPOSURE_TIME, &[(1, 125)]),
            RawEntry::undefined(TAG_EXIF_VERSION, b"0230"),
            RawEntry::link(0xa005, "iop"),
        ],
        None,
    );

    writer.directory(
        "iop",
        &[
            RawEntry::ascii(TAG_INTEROP_INDEX, "R98"),
            RawEntry::undefined(TAG_INTEROP_VERSION, b"0100"),
        ],
        None,
    );

    writer.directory(
        "gps",
        &[
            RawEntry::bytes(0x0000, &[2, 2, 0, 0]),
            RawEntry::ascii(0x0001, "N"),
            RawEntry::rationals(order, 0x0002, &[(26, 1), (35, 1), (1230, 100)]),
            RawEntry::ascii(0x0003, "W"),
            RawEntry::rationals(order, 0x0004, &[(80, 1), (3, 1), (13, 1)]),
            RawEntry::bytes(0x0005, &[0]),
            RawEntry::rationals(order, 0x0006, &[(5, 1)]),
            RawEntry::rationals(order, 0x0007, &[(1, 1), (22, 1), (57, 1)]),
            RawEntry::ascii(0x001d, "2018:04:29"),
        ],
        None,
    );

    writer.directory(
        "ifd1",
        &[
            RawEntry::short(order, TAG_COMPRESSION, 6),
            RawEntry::link(0x0201, "thumbnail"),
            RawEntry::long(order, 0x0202, THUMBNAIL.len() as u32),
        ],
        None,
    );

    writer.data("thumbnail", &THUMBNAIL);
    writer.finish()
}

/// A blob with a single IFD0 holding `entries`.
pub fn single_directory_blob(order: ByteOrder, entries: &[RawEntry]) -> Vec<u8> {
    let mut writer = BlobWriter::new(order);
    writer.directory("ifd0", entries, None);
    writer.finish()
}

/// Wrap a blob in a minimal JPEG APP1 segment.
pub fn wrap_in_jpeg(blob: &[u8]) -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let segment_len = (blob.len() + 8) as u16;
    jpeg.extend_from_slice(&segment_len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(blob);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}
