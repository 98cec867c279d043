//! Tag value types.
//!
//! Each directory entry declares one of the primitive types below. Values are
//! stored as `count` consecutive units of that type; when the total size fits
//! in four bytes the units sit inline in the entry, otherwise the entry holds
//! an offset to them.
//!
//! | Code | Type      | Unit size |
//! |------|-----------|-----------|
//! | 1    | BYTE      | 1         |
//! | 2    | ASCII     | 1         |
//! | 3    | SHORT     | 2         |
//! | 4    | LONG      | 4         |
//! | 5    | RATIONAL  | 8         |
//! | 7    | UNDEFINED | 1         |
//! | 9    | SLONG     | 4         |
//! | 10   | SRATIONAL | 8         |
//! | 11   | FLOAT     | 4         |
//! | 12   | DOUBLE    | 8         |

use std::fmt;

use serde::{Deserialize, Serialize};

use super::header::ByteOrder;
use super::undefined::UndefinedValue;
use crate::error::ExifError;

/// Number of bytes that fit directly in a directory entry
pub const INLINE_THRESHOLD: usize = 4;

// =============================================================================
// TagType
// =============================================================================

/// Primitive value type of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum TagType {
    Byte = 1,
    Ascii = 2,
    Short = 3,
    Long = 4,
    Rational = 5,
    Undefined = 7,
    SignedLong = 9,
    SignedRational = 10,
    Float = 11,
    Double = 12,
    /// ASCII text stored without a terminating NUL.
    ///
    /// Only produced by undefined-tag decoders; never appears on the wire.
    AsciiNoNul = 0xF0,
}

impl TagType {
    /// Decode a wire type code.
    ///
    /// Returns `None` for unknown codes and for the internal [`TagType::AsciiNoNul`].
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            1 => Some(TagType::Byte),
            2 => Some(TagType::Ascii),
            3 => Some(TagType::Short),
            4 => Some(TagType::Long),
            5 => Some(TagType::Rational),
            7 => Some(TagType::Undefined),
            9 => Some(TagType::SignedLong),
            10 => Some(TagType::SignedRational),
            11 => Some(TagType::Float),
            12 => Some(TagType::Double),
            _ => None,
        }
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    /// Size in bytes of one unit of this type.
    pub fn size(self) -> usize {
        match self {
            TagType::Byte | TagType::Ascii | TagType::AsciiNoNul | TagType::Undefined => 1,
            TagType::Short => 2,
            TagType::Long | TagType::SignedLong | TagType::Float => 4,
            TagType::Rational | TagType::SignedRational | TagType::Double => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TagType::Byte => "BYTE",
            TagType::Ascii => "ASCII",
            TagType::Short => "SHORT",
            TagType::Long => "LONG",
            TagType::Rational => "RATIONAL",
            TagType::Undefined => "UNDEFINED",
            TagType::SignedLong => "SLONG",
            TagType::SignedRational => "SRATIONAL",
            TagType::Float => "FLOAT",
            TagType::Double => "DOUBLE",
            TagType::AsciiNoNul => "_ASCII_NO_NUL",
        }
    }

    /// Look a type up by its [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        [
            TagType::Byte,
            TagType::Ascii,
            TagType::Short,
            TagType::Long,
            TagType::Rational,
            TagType::Undefined,
            TagType::SignedLong,
            TagType::SignedRational,
            TagType::Float,
            TagType::Double,
            TagType::AsciiNoNul,
        ]
        .into_iter()
        .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// The type code written to the wire for values of this type.
    pub fn wire_type(self) -> TagType {
        match self {
            TagType::AsciiNoNul => TagType::Ascii,
            other => other,
        }
    }

    /// Whether `count` units of this type fit inline in a directory entry.
    #[inline]
    pub fn fits_inline(self, count: u32) -> bool {
        (count as u64) * (self.size() as u64) <= INLINE_THRESHOLD as u64
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Rationals
// =============================================================================

/// Unsigned fraction (RATIONAL).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    pub numerator: u32,
    pub denominator: u32,
}

impl Rational {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// The fraction as a float, or `None` when the denominator is zero.
    pub fn to_f64(self) -> Option<f64> {
        (self.denominator != 0).then(|| self.numerator as f64 / self.denominator as f64)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Signed fraction (SRATIONAL).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignedRational {
    pub numerator: i32,
    pub denominator: i32,
}

impl SignedRational {
    pub fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn to_f64(self) -> Option<f64> {
        (self.denominator != 0).then(|| self.numerator as f64 / self.denominator as f64)
    }
}

impl fmt::Display for SignedRational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

// =============================================================================
// TagValue
// =============================================================================

/// A decoded tag value.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Bytes(Vec<u8>),
    Ascii(String),
    AsciiNoNul(String),
    Shorts(Vec<u16>),
    Longs(Vec<u32>),
    Rationals(Vec<Rational>),
    SignedLongs(Vec<i32>),
    SignedRationals(Vec<SignedRational>),
    Floats(Vec<f32>),
    Doubles(Vec<f64>),
    Undefined(UndefinedValue),
}

impl TagValue {
    pub fn tag_type(&self) -> TagType {
        match self {
            TagValue::Bytes(_) => TagType::Byte,
            TagValue::Ascii(_) => TagType::Ascii,
            TagValue::AsciiNoNul(_) => TagType::AsciiNoNul,
            TagValue::Shorts(_) => TagType::Short,
            TagValue::Longs(_) => TagType::Long,
            TagValue::Rationals(_) => TagType::Rational,
            TagValue::SignedLongs(_) => TagType::SignedLong,
            TagValue::SignedRationals(_) => TagType::SignedRational,
            TagValue::Floats(_) => TagType::Float,
            TagValue::Doubles(_) => TagType::Double,
            TagValue::Undefined(_) => TagType::Undefined,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            TagValue::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// Text of an ASCII value (with or without NUL on the wire).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Ascii(s) | TagValue::AsciiNoNul(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_shorts(&self) -> Option<&[u16]> {
        match self {
            TagValue::Shorts(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_longs(&self) -> Option<&[u32]> {
        match self {
            TagValue::Longs(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_rationals(&self) -> Option<&[Rational]> {
        match self {
            TagValue::Rationals(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_signed_rationals(&self) -> Option<&[SignedRational]> {
        match self {
            TagValue::SignedRationals(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_undefined(&self) -> Option<&UndefinedValue> {
        match self {
            TagValue::Undefined(v) => Some(v),
            _ => None,
        }
    }

    /// Encode into wire bytes.
    pub fn encode(&self, order: ByteOrder) -> Result<EncodedValue, ExifError> {
        let mut bytes = Vec::new();
        let unit_count = match self {
            TagValue::Bytes(v) => {
                bytes.extend_from_slice(v);
                v.len()
            }
            TagValue::Ascii(s) => {
                bytes.extend_from_slice(s.as_bytes());
                bytes.push(0);
                bytes.len()
            }
            TagValue::AsciiNoNul(s) => {
                bytes.extend_from_slice(s.as_bytes());
                bytes.len()
            }
            TagValue::Shorts(v) => {
                v.iter().for_each(|n| order.put_u16(&mut bytes, *n));
                v.len()
            }
            TagValue::Longs(v) => {
                v.iter().for_each(|n| order.put_u32(&mut bytes, *n));
                v.len()
            }
            TagValue::Rationals(v) => {
                for r in v {
                    order.put_u32(&mut bytes, r.numerator);
                    order.put_u32(&mut bytes, r.denominator);
                }
                v.len()
            }
            TagValue::SignedLongs(v) => {
                v.iter().for_each(|n| order.put_i32(&mut bytes, *n));
                v.len()
            }
            TagValue::SignedRationals(v) => {
                for r in v {
                    order.put_i32(&mut bytes, r.numerator);
                    order.put_i32(&mut bytes, r.denominator);
                }
                v.len()
            }
            TagValue::Floats(v) => {
                v.iter().for_each(|n| order.put_f32(&mut bytes, *n));
                v.len()
            }
            TagValue::Doubles(v) => {
                v.iter().for_each(|n| order.put_f64(&mut bytes, *n));
                v.len()
            }
            TagValue::Undefined(u) => return u.encode(),
        };

        Ok(EncodedValue {
            tag_type: self.tag_type(),
            unit_count: unit_count as u32,
            bytes,
        })
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Ascii(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Ascii(value)
    }
}

impl From<Vec<u8>> for TagValue {
    fn from(value: Vec<u8>) -> Self {
        TagValue::Bytes(value)
    }
}

impl From<u16> for TagValue {
    fn from(value: u16) -> Self {
        TagValue::Shorts(vec![value])
    }
}

impl From<u32> for TagValue {
    fn from(value: u32) -> Self {
        TagValue::Longs(vec![value])
    }
}

impl From<Rational> for TagValue {
    fn from(value: Rational) -> Self {
        TagValue::Rationals(vec![value])
    }
}

impl From<Vec<Rational>> for TagValue {
    fn from(value: Vec<Rational>) -> Self {
        TagValue::Rationals(value)
    }
}

impl From<UndefinedValue> for TagValue {
    fn from(value: UndefinedValue) -> Self {
        TagValue::Undefined(value)
    }
}

/// A value encoded for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedValue {
    pub tag_type: TagType,
    pub bytes: Vec<u8>,
    pub unit_count: u32,
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode `unit_count` units of `tag_type` from `bytes`.
///
/// UNDEFINED values are tag-specific and are decoded by
/// [`UndefinedValue::decode`] instead.
///
/// # Errors
/// - `ValueUnparseable` if `bytes` is shorter than the declared units, or if
///   `tag_type` is UNDEFINED
pub fn parse_value(
    tag_type: TagType,
    bytes: &[u8],
    unit_count: u32,
    order: ByteOrder,
) -> Result<TagValue, ExifError> {
    let count = unit_count as usize;
    let needed = count
        .checked_mul(tag_type.size())
        .ok_or_else(|| ExifError::ValueUnparseable(format!("unit count {count} overflows")))?;
    if bytes.len() < needed {
        return Err(ExifError::ValueUnparseable(format!(
            "{tag_type} value needs {needed} bytes, got {}",
            bytes.len()
        )));
    }
    let data = &bytes[..needed];

    let value = match tag_type {
        TagType::Byte => TagValue::Bytes(data.to_vec()),
        TagType::Ascii => {
            let text = match data.split_last() {
                Some((&0, rest)) => rest,
                _ => data,
            };
            TagValue::Ascii(String::from_utf8_lossy(text).into_owned())
        }
        TagType::AsciiNoNul => TagValue::AsciiNoNul(String::from_utf8_lossy(data).into_owned()),
        TagType::Short => TagValue::Shorts(data.chunks_exact(2).map(|c| order.read_u16(c)).collect()),
        TagType::Long => TagValue::Longs(data.chunks_exact(4).map(|c| order.read_u32(c)).collect()),
        TagType::Rational => TagValue::Rationals(
            data.chunks_exact(8)
                .map(|c| Rational::new(order.read_u32(&c[0..4]), order.read_u32(&c[4..8])))
                .collect(),
        ),
        TagType::SignedLong => {
            TagValue::SignedLongs(data.chunks_exact(4).map(|c| order.read_i32(c)).collect())
        }
        TagType::SignedRational => TagValue::SignedRationals(
            data.chunks_exact(8)
                .map(|c| SignedRational::new(order.read_i32(&c[0..4]), order.read_i32(&c[4..8])))
                .collect(),
        ),
        TagType::Float => TagValue::Floats(data.chunks_exact(4).map(|c| order.read_f32(c)).collect()),
        TagType::Double => {
            TagValue::Doubles(data.chunks_exact(8).map(|c| order.read_f64(c)).collect())
        }
        TagType::Undefined => {
            return Err(ExifError::ValueUnparseable(
                "UNDEFINED values need a tag-specific decoder".to_string(),
            ))
        }
    };

    Ok(value)
}

// =============================================================================
// Formatting
// =============================================================================

/// Whether text is printable (carriage returns and newlines allowed).
pub fn is_printable_text(text: &str) -> bool {
    text.chars()
        .all(|c| c == '\r' || c == '\n' || !(c.is_control() || c == char::REPLACEMENT_CHARACTER))
}

/// Render bytes as space-separated lowercase hex pairs.
pub fn dump_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_list<T: fmt::Display>(items: &[T], just_first: bool) -> String {
    match items {
        [] => String::new(),
        [first, rest @ ..] if just_first => {
            let suffix = if rest.is_empty() { "" } else { "..." };
            format!("{first}{suffix}")
        }
        _ => {
            let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
            format!("[{}]", parts.join(" "))
        }
    }
}

/// Render a value as display text.
///
/// Lists print as `[a b c]`, or as `a...` when `just_first` is set and more
/// than one unit is present. Text is cut at its first NUL.
pub fn format_value(value: &TagValue, just_first: bool) -> String {
    match value {
        TagValue::Bytes(v) => dump_bytes(v),
        TagValue::Ascii(s) | TagValue::AsciiNoNul(s) => {
            let text = s.split('\0').next().unwrap_or_default();
            if is_printable_text(text) {
                text.to_string()
            } else {
                format!("string with binary data ({} bytes)", text.len())
            }
        }
        TagValue::Shorts(v) => format_list(v, just_first),
        TagValue::Longs(v) => format_list(v, just_first),
        TagValue::Rationals(v) => format_list(v, just_first),
        TagValue::SignedLongs(v) => format_list(v, just_first),
        TagValue::SignedRationals(v) => format_list(v, just_first),
        TagValue::Floats(v) => format_list(v, just_first),
        TagValue::Doubles(v) => format_list(v, just_first),
        TagValue::Undefined(u) => {
            let text = u.to_string();
            if is_printable_text(&text) {
                text
            } else {
                format!("stringable with binary data ({} bytes)", text.len())
            }
        }
    }
}

// =============================================================================
// String translation
// =============================================================================

fn unparseable(tag_type: TagType, text: &str, err: impl fmt::Display) -> ExifError {
    ExifError::ValueUnparseable(format!("{text:?} is not a valid {tag_type}: {err}"))
}

fn split_fraction(tag_type: TagType, text: &str) -> Result<(&str, &str), ExifError> {
    text.split_once('/')
        .map(|(n, d)| (n.trim(), d.trim()))
        .ok_or_else(|| unparseable(tag_type, text, "expected numerator/denominator"))
}

/// Parse user-supplied text into a single-unit value of `tag_type`.
///
/// BYTE values are read as hex (`"ff"`, or `"0a0b"` for several bytes),
/// rationals as `numerator/denominator`.
///
/// # Errors
/// - `ValueUnparseable` for malformed text, and always for UNDEFINED
pub fn translate_string_to_type(tag_type: TagType, text: &str) -> Result<TagValue, ExifError> {
    let text_trimmed = text.trim();
    let value = match tag_type {
        TagType::Byte => TagValue::Bytes(
            hex::decode(text_trimmed).map_err(|e| unparseable(tag_type, text, e))?,
        ),
        TagType::Ascii => TagValue::Ascii(text.to_string()),
        TagType::AsciiNoNul => TagValue::AsciiNoNul(text.to_string()),
        TagType::Short => TagValue::Shorts(vec![text_trimmed
            .parse()
            .map_err(|e| unparseable(tag_type, text, e))?]),
        TagType::Long => TagValue::Longs(vec![text_trimmed
            .parse()
            .map_err(|e| unparseable(tag_type, text, e))?]),
        TagType::SignedLong => TagValue::SignedLongs(vec![text_trimmed
            .parse()
            .map_err(|e| unparseable(tag_type, text, e))?]),
        TagType::Float => TagValue::Floats(vec![text_trimmed
            .parse()
            .map_err(|e| unparseable(tag_type, text, e))?]),
        TagType::Double => TagValue::Doubles(vec![text_trimmed
            .parse()
            .map_err(|e| unparseable(tag_type, text, e))?]),
        TagType::Rational => {
            let (n, d) = split_fraction(tag_type, text_trimmed)?;
            TagValue::Rationals(vec![Rational::new(
                n.parse().map_err(|e| unparseable(tag_type, text, e))?,
                d.parse().map_err(|e| unparseable(tag_type, text, e))?,
            )])
        }
        TagType::SignedRational => {
            let (n, d) = split_fraction(tag_type, text_trimmed)?;
            TagValue::SignedRationals(vec![SignedRational::new(
                n.parse().map_err(|e| unparseable(tag_type, text, e))?,
                d.parse().map_err(|e| unparseable(tag_type, text, e))?,
            )])
        }
        TagType::Undefined => {
            return Err(ExifError::ValueUnparseable(
                "UNDEFINED values cannot be translated from text".to_string(),
            ))
        }
    };
    Ok(value)
}
