//! Metadata blob header and byte order.
//!
//! Every blob opens with an 8-byte header:
//!
//! ```text
//! Bytes 0-3: Signature ("II" 0x2A 0x00 = little-endian, "MM" 0x00 0x2A = big-endian)
//! Bytes 4-7: Offset to the first directory, in the signature's byte order
//! ```
//!
//! All offsets in the blob, including this one, count from byte 0 of the header.

use bytes::BufMut;

use crate::error::ExifError;

// =============================================================================
// Constants
// =============================================================================

/// Size of the header in bytes
pub const EXIF_HEADER_SIZE: usize = 8;

/// First-directory offset written by the encoder (directly after the header)
pub const DEFAULT_FIRST_IFD_OFFSET: u32 = EXIF_HEADER_SIZE as u32;

/// Little-endian signature ("II*\0")
pub const SIGNATURE_LITTLE_ENDIAN: [u8; 4] = [0x49, 0x49, 0x2A, 0x00];

/// Big-endian signature ("MM\0*")
pub const SIGNATURE_BIG_ENDIAN: [u8; 4] = [0x4D, 0x4D, 0x00, 0x2A];

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order of a blob.
///
/// Fixed for the whole blob; every multi-byte read and write goes through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    BigEndian,
}

macro_rules! read_as {
    ($name:ident, $ty:ty, $n:literal) => {
        /// Read from the first bytes of `bytes`.
        ///
        /// # Panics
        /// Panics if the slice is too short.
        #[inline]
        pub fn $name(self, bytes: &[u8]) -> $ty {
            let mut raw = [0u8; $n];
            raw.copy_from_slice(&bytes[..$n]);
            match self {
                ByteOrder::LittleEndian => <$ty>::from_le_bytes(raw),
                ByteOrder::BigEndian => <$ty>::from_be_bytes(raw),
            }
        }
    };
}

impl ByteOrder {
    read_as!(read_u16, u16, 2);
    read_as!(read_u32, u32, 4);
    read_as!(read_i32, i32, 4);
    read_as!(read_f32, f32, 4);
    read_as!(read_f64, f64, 8);

    /// Append a u16 in this byte order.
    #[inline]
    pub fn put_u16(self, buf: &mut impl BufMut, value: u16) {
        match self {
            ByteOrder::LittleEndian => buf.put_u16_le(value),
            ByteOrder::BigEndian => buf.put_u16(value),
        }
    }

    /// Append a u32 in this byte order.
    #[inline]
    pub fn put_u32(self, buf: &mut impl BufMut, value: u32) {
        match self {
            ByteOrder::LittleEndian => buf.put_u32_le(value),
            ByteOrder::BigEndian => buf.put_u32(value),
        }
    }

    #[inline]
    pub fn put_i32(self, buf: &mut impl BufMut, value: i32) {
        match self {
            ByteOrder::LittleEndian => buf.put_i32_le(value),
            ByteOrder::BigEndian => buf.put_i32(value),
        }
    }

    #[inline]
    pub fn put_f32(self, buf: &mut impl BufMut, value: f32) {
        match self {
            ByteOrder::LittleEndian => buf.put_f32_le(value),
            ByteOrder::BigEndian => buf.put_f32(value),
        }
    }

    #[inline]
    pub fn put_f64(self, buf: &mut impl BufMut, value: f64) {
        match self {
            ByteOrder::LittleEndian => buf.put_f64_le(value),
            ByteOrder::BigEndian => buf.put_f64(value),
        }
    }

    /// The 4-byte signature announcing this byte order.
    pub fn signature(self) -> [u8; 4] {
        match self {
            ByteOrder::LittleEndian => SIGNATURE_LITTLE_ENDIAN,
            ByteOrder::BigEndian => SIGNATURE_BIG_ENDIAN,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "little-endian",
            ByteOrder::BigEndian => "big-endian",
        }
    }
}

// =============================================================================
// ExifHeader
// =============================================================================

/// Parsed blob header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExifHeader {
    /// Byte order for all multi-byte values in the blob
    pub byte_order: ByteOrder,

    /// Offset of the first directory (IFD0)
    pub first_ifd_offset: u32,
}

impl ExifHeader {
    /// Parse a header from the first eight bytes of `bytes`.
    ///
    /// Nothing past byte 8 is inspected.
    ///
    /// # Errors
    /// - `HeaderTooShort` if fewer than 8 bytes are available
    /// - `InvalidSignature` if the signature is not one of the two byte-order marks
    pub fn parse(bytes: &[u8]) -> Result<Self, ExifError> {
        if bytes.len() < EXIF_HEADER_SIZE {
            return Err(ExifError::HeaderTooShort {
                actual: bytes.len(),
            });
        }

        let mut signature = [0u8; 4];
        signature.copy_from_slice(&bytes[0..4]);
        let byte_order = match signature {
            SIGNATURE_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            SIGNATURE_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => return Err(ExifError::InvalidSignature(signature)),
        };

        let first_ifd_offset = byte_order.read_u32(&bytes[4..8]);

        Ok(ExifHeader {
            byte_order,
            first_ifd_offset,
        })
    }

    /// Serialize a header for the given byte order and first-directory offset.
    pub fn build(byte_order: ByteOrder, first_ifd_offset: u32) -> [u8; EXIF_HEADER_SIZE] {
        let mut out = [0u8; EXIF_HEADER_SIZE];
        out[0..4].copy_from_slice(&byte_order.signature());
        let mut tail = &mut out[4..];
        byte_order.put_u32(&mut tail, first_ifd_offset);
        out
    }

    pub fn to_bytes(&self) -> [u8; EXIF_HEADER_SIZE] {
        Self::build(self.byte_order, self.first_ifd_offset)
    }
}
