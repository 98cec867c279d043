//! Decoders for UNDEFINED-typed tags.
//!
//! An UNDEFINED value is a byte string whose layout depends on the tag. Only
//! the tags below are understood; any other UNDEFINED tag fails with
//! `UnhandledUndefinedTag` and is shown as a placeholder.
//!
//! | Kind    | Tag    | Name                     | Decoded as                 |
//! |---------|--------|--------------------------|----------------------------|
//! | Exif    | 0x9000 | ExifVersion              | text                       |
//! | Exif    | 0xA000 | FlashpixVersion          | text                       |
//! | Exif    | 0x9286 | UserComment              | 8-byte encoding + payload  |
//! | Exif    | 0x927C | MakerNote                | opaque, 20-byte type id    |
//! | Exif    | 0x9101 | ComponentsConfiguration  | channel layout             |
//! | GPSInfo | 0x001B | GPSProcessingMethod      | text                       |
//! | GPSInfo | 0x001C | GPSAreaInformation       | text                       |
//! | Iop     | 0x0002 | InteroperabilityVersion  | text                       |

use std::fmt;

use sha2::{Digest, Sha256};
use tracing::warn;

use super::kinds::DirectoryKind;
use super::types::{dump_bytes, EncodedValue, TagType};
use crate::error::ExifError;

pub const TAG_EXIF_VERSION: u16 = 0x9000;
pub const TAG_FLASHPIX_VERSION: u16 = 0xA000;
pub const TAG_USER_COMMENT: u16 = 0x9286;
pub const TAG_MAKER_NOTE: u16 = 0x927C;
pub const TAG_COMPONENTS_CONFIGURATION: u16 = 0x9101;
pub const TAG_GPS_PROCESSING_METHOD: u16 = 0x001B;
pub const TAG_GPS_AREA_INFORMATION: u16 = 0x001C;
pub const TAG_INTEROPERABILITY_VERSION: u16 = 0x0002;

/// Length of the UserComment encoding prefix
const USER_COMMENT_PREFIX_LEN: usize = 8;

/// Number of leading MakerNote bytes shown as its type id
const MAKER_NOTE_TYPE_LEN: usize = 20;

// =============================================================================
// UserComment
// =============================================================================

/// Character encoding declared by a UserComment prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommentEncoding {
    Ascii,
    Jis,
    Unicode,
    Undefined,
}

impl UserCommentEncoding {
    const ALL: [UserCommentEncoding; 4] = [
        UserCommentEncoding::Ascii,
        UserCommentEncoding::Jis,
        UserCommentEncoding::Unicode,
        UserCommentEncoding::Undefined,
    ];

    pub fn prefix(self) -> [u8; USER_COMMENT_PREFIX_LEN] {
        match self {
            UserCommentEncoding::Ascii => *b"ASCII\0\0\0",
            UserCommentEncoding::Jis => *b"JIS\0\0\0\0\0",
            UserCommentEncoding::Unicode => *b"Unicode\0",
            UserCommentEncoding::Undefined => [0; USER_COMMENT_PREFIX_LEN],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UserCommentEncoding::Ascii => "ASCII",
            UserCommentEncoding::Jis => "JIS",
            UserCommentEncoding::Unicode => "UNICODE",
            UserCommentEncoding::Undefined => "UNDEFINED",
        }
    }

    fn from_prefix(prefix: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.prefix() == prefix)
    }
}

// =============================================================================
// ComponentsConfiguration
// =============================================================================

/// Channel layout declared by ComponentsConfiguration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentsLayout {
    Rgb,
    YCbCr,
    Other,
}

impl ComponentsLayout {
    const RGB: [u8; 4] = [4, 5, 6, 0];
    const YCBCR: [u8; 4] = [1, 2, 3, 0];

    fn from_bytes(bytes: &[u8]) -> Self {
        if bytes == Self::RGB {
            ComponentsLayout::Rgb
        } else if bytes == Self::YCBCR {
            ComponentsLayout::YCbCr
        } else {
            ComponentsLayout::Other
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ComponentsLayout::Rgb => "RGB",
            ComponentsLayout::YCbCr => "YCBCR",
            ComponentsLayout::Other => "OTHER",
        }
    }
}

// =============================================================================
// UndefinedValue
// =============================================================================

/// A decoded UNDEFINED tag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndefinedValue {
    /// Text stored without a terminating NUL (version fields, GPS text).
    /// Bytes are kept as read; they need not be UTF-8.
    Text(Vec<u8>),
    UserComment {
        encoding: UserCommentEncoding,
        payload: Vec<u8>,
    },
    MakerNote {
        type_id: Vec<u8>,
        data: Vec<u8>,
    },
    ComponentsConfiguration {
        layout: ComponentsLayout,
        bytes: Vec<u8>,
    },
}

enum Decoder {
    Text,
    UserComment,
    MakerNote,
    ComponentsConfiguration,
}

fn decoder_for(kind: DirectoryKind, tag_id: u16) -> Option<Decoder> {
    match (kind, tag_id) {
        (DirectoryKind::Exif, TAG_EXIF_VERSION | TAG_FLASHPIX_VERSION) => Some(Decoder::Text),
        (DirectoryKind::Exif, TAG_USER_COMMENT) => Some(Decoder::UserComment),
        (DirectoryKind::Exif, TAG_MAKER_NOTE) => Some(Decoder::MakerNote),
        (DirectoryKind::Exif, TAG_COMPONENTS_CONFIGURATION) => {
            Some(Decoder::ComponentsConfiguration)
        }
        (DirectoryKind::GpsInfo, TAG_GPS_PROCESSING_METHOD | TAG_GPS_AREA_INFORMATION) => {
            Some(Decoder::Text)
        }
        (DirectoryKind::Interop, TAG_INTEROPERABILITY_VERSION) => Some(Decoder::Text),
        _ => None,
    }
}

impl UndefinedValue {
    /// Whether a decoder exists for this tag.
    pub fn is_handled(kind: DirectoryKind, tag_id: u16) -> bool {
        decoder_for(kind, tag_id).is_some()
    }

    /// Decode the raw bytes of an UNDEFINED tag.
    ///
    /// # Errors
    /// - `UnhandledUndefinedTag` if no decoder exists for the tag
    /// - `ValueUnparseable` if the bytes do not fit the tag's layout
    pub fn decode(kind: DirectoryKind, tag_id: u16, bytes: &[u8]) -> Result<Self, ExifError> {
        let decoder = decoder_for(kind, tag_id).ok_or(ExifError::UnhandledUndefinedTag {
            kind: kind.name(),
            tag_id,
        })?;

        let value = match decoder {
            Decoder::Text => UndefinedValue::Text(bytes.to_vec()),
            Decoder::UserComment => {
                if bytes.len() < USER_COMMENT_PREFIX_LEN {
                    return Err(ExifError::ValueUnparseable(format!(
                        "UserComment needs an {USER_COMMENT_PREFIX_LEN}-byte prefix, got {} bytes",
                        bytes.len()
                    )));
                }
                let (prefix, payload) = bytes.split_at(USER_COMMENT_PREFIX_LEN);
                match UserCommentEncoding::from_prefix(prefix) {
                    Some(encoding) => UndefinedValue::UserComment {
                        encoding,
                        payload: payload.to_vec(),
                    },
                    None => {
                        warn!(prefix = %dump_bytes(prefix), "UserComment encoding not recognised");
                        UndefinedValue::UserComment {
                            encoding: UserCommentEncoding::Undefined,
                            payload: Vec::new(),
                        }
                    }
                }
            }
            Decoder::MakerNote => UndefinedValue::MakerNote {
                type_id: bytes[..bytes.len().min(MAKER_NOTE_TYPE_LEN)].to_vec(),
                data: bytes.to_vec(),
            },
            Decoder::ComponentsConfiguration => UndefinedValue::ComponentsConfiguration {
                layout: ComponentsLayout::from_bytes(bytes),
                bytes: bytes.to_vec(),
            },
        };

        Ok(value)
    }

    /// Encode back into wire bytes (type UNDEFINED, one unit per byte).
    pub fn encode(&self) -> Result<EncodedValue, ExifError> {
        let bytes = match self {
            UndefinedValue::Text(bytes) => bytes.clone(),
            UndefinedValue::UserComment { encoding, payload } => {
                let mut out = encoding.prefix().to_vec();
                out.extend_from_slice(payload);
                out
            }
            UndefinedValue::MakerNote { data, .. } => data.clone(),
            UndefinedValue::ComponentsConfiguration { bytes, .. } => bytes.clone(),
        };
        let unit_count = u32::try_from(bytes.len())
            .map_err(|_| ExifError::ValueUnparseable("value exceeds 4 GiB".to_string()))?;

        Ok(EncodedValue {
            tag_type: TagType::Undefined,
            bytes,
            unit_count,
        })
    }
}

impl fmt::Display for UndefinedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndefinedValue::Text(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            UndefinedValue::UserComment { encoding, payload } => {
                let shown = &payload[..payload.len().min(USER_COMMENT_PREFIX_LEN)];
                let more = if payload.len() > shown.len() { "..." } else { "" };
                write!(
                    f,
                    "UserComment<ENCODING=[{}] LEN=({}) V=[{}]{}>",
                    encoding.name(),
                    payload.len(),
                    dump_bytes(shown),
                    more
                )
            }
            UndefinedValue::MakerNote { type_id, data } => {
                let digest = Sha256::digest(data);
                write!(
                    f,
                    "MakerNote<TYPE-ID=[{}] LEN=({}) SHA256=[{}]>",
                    dump_bytes(type_id),
                    data.len(),
                    hex::encode(&digest[..10])
                )
            }
            UndefinedValue::ComponentsConfiguration { layout, bytes } => write!(
                f,
                "ComponentsConfiguration<ID=[{}] BYTES=[{}]>",
                layout.name(),
                dump_bytes(bytes)
            ),
        }
    }
}
