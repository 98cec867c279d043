//! GPS information assembled from a GPSInfo directory.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::warn;

use super::entry::Entry;
use super::types::{Rational, TagValue};
use crate::error::ExifError;

pub const TAG_GPS_VERSION_ID: u16 = 0x0000;
pub const TAG_GPS_LATITUDE_REF: u16 = 0x0001;
pub const TAG_GPS_LATITUDE: u16 = 0x0002;
pub const TAG_GPS_LONGITUDE_REF: u16 = 0x0003;
pub const TAG_GPS_LONGITUDE: u16 = 0x0004;
pub const TAG_GPS_ALTITUDE_REF: u16 = 0x0005;
pub const TAG_GPS_ALTITUDE: u16 = 0x0006;
pub const TAG_GPS_TIMESTAMP: u16 = 0x0007;
pub const TAG_GPS_DATESTAMP: u16 = 0x001D;

/// Accepted GPSVersionID values.
pub const SUPPORTED_GPS_VERSIONS: [[u8; 4]; 3] = [[2, 0, 0, 0], [2, 2, 0, 0], [2, 3, 0, 0]];

/// A coordinate as degrees, minutes and seconds with its hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpsDegrees {
    /// 'N', 'S', 'E' or 'W'
    pub orientation: char,
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
}

impl GpsDegrees {
    /// Build from a reference string and a (degrees, minutes, seconds)
    /// rational triple.
    ///
    /// # Errors
    /// - `GpsCoordinatesNotValid` for an empty reference, a triple of the wrong
    ///   length or a zero denominator
    pub fn from_rationals(reference: &str, values: &[Rational]) -> Result<Self, ExifError> {
        let orientation = reference.chars().next().ok_or_else(|| {
            ExifError::GpsCoordinatesNotValid("coordinate reference is empty".to_string())
        })?;

        let [degrees, minutes, seconds] = values else {
            return Err(ExifError::GpsCoordinatesNotValid(format!(
                "expected 3 rationals, got {}",
                values.len()
            )));
        };

        let part = |r: &Rational| {
            r.to_f64().ok_or_else(|| {
                ExifError::GpsCoordinatesNotValid(format!("zero denominator in {r}"))
            })
        };

        Ok(Self {
            orientation,
            degrees: part(degrees)?,
            minutes: part(minutes)?,
            seconds: part(seconds)?,
        })
    }

    /// Signed decimal degrees; southern and western values are negative.
    pub fn decimal(&self) -> f64 {
        let value = self.degrees + self.minutes / 60.0 + self.seconds / 3600.0;
        match self.orientation {
            'S' | 'W' => -value,
            _ => value,
        }
    }
}

impl std::fmt::Display for GpsDegrees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Degrees<O=[{}] D=({}) M=({}) S=({})>",
            self.orientation, self.degrees, self.minutes, self.seconds
        )
    }
}

/// Location summary of a GPSInfo directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpsInfo {
    pub latitude: GpsDegrees,
    pub longitude: GpsDegrees,
    /// Metres; negative below sea level
    pub altitude: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl std::fmt::Display for GpsInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GpsInfo<LAT=({:.5}) LON=({:.5})",
            self.latitude.decimal(),
            self.longitude.decimal()
        )?;
        if let Some(altitude) = self.altitude {
            write!(f, " ALT=({altitude})")?;
        }
        if let Some(timestamp) = self.timestamp {
            write!(f, " TIME=[{}]", timestamp.format("%Y-%m-%d %H:%M:%S"))?;
        }
        write!(f, ">")
    }
}

fn first_value(entries: &[Entry], tag_id: u16) -> Option<Result<TagValue, ExifError>> {
    entries
        .iter()
        .find(|e| e.tag_id() == tag_id)
        .map(|e| e.value())
}

fn required(entries: &[Entry], tag_id: u16, what: &str) -> Result<TagValue, ExifError> {
    match first_value(entries, tag_id) {
        Some(value) => value,
        None => Err(ExifError::GpsCoordinatesNotValid(format!("{what} is missing"))),
    }
}

fn coordinate(
    entries: &[Entry],
    value_tag: u16,
    reference_tag: u16,
    what: &str,
) -> Result<GpsDegrees, ExifError> {
    let value = required(entries, value_tag, what)?;
    let reference = required(entries, reference_tag, what)?;
    let rationals = value.as_rationals().ok_or_else(|| {
        ExifError::GpsCoordinatesNotValid(format!("{what} is not stored as rationals"))
    })?;
    let reference = reference.as_str().ok_or_else(|| {
        ExifError::GpsCoordinatesNotValid(format!("{what} reference is not text"))
    })?;
    GpsDegrees::from_rationals(reference, rationals)
}

fn altitude(entries: &[Entry]) -> Result<Option<f64>, ExifError> {
    let Some(value) = first_value(entries, TAG_GPS_ALTITUDE) else {
        return Ok(None);
    };
    let value = value?;
    let Some(metres) = value
        .as_rationals()
        .and_then(|r| r.first())
        .and_then(|r| r.to_f64())
    else {
        return Ok(None);
    };

    let below_sea_level = match first_value(entries, TAG_GPS_ALTITUDE_REF) {
        Some(reference) => reference?.as_bytes().and_then(|b| b.first()) == Some(&1),
        None => false,
    };
    Ok(Some(if below_sea_level { -metres } else { metres }))
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let normalized = text.trim_end_matches('\0').replace('-', ":");
    let mut parts = normalized.split(':').map(|p| p.trim().parse::<i64>().ok());
    let year = parts.next()??;
    let month = parts.next()??;
    let day = parts.next()??;
    NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )
}

fn timestamp(entries: &[Entry]) -> Result<Option<DateTime<Utc>>, ExifError> {
    let (Some(date), Some(time)) = (
        first_value(entries, TAG_GPS_DATESTAMP),
        first_value(entries, TAG_GPS_TIMESTAMP),
    ) else {
        return Ok(None);
    };
    let (date, time) = (date?, time?);

    let Some(day) = date.as_str().and_then(parse_date) else {
        warn!("GPS date stamp is not parseable; skipping timestamp");
        return Ok(None);
    };
    let parts: Option<Vec<u32>> = time
        .as_rationals()
        .filter(|r| r.len() == 3)
        .map(|r| {
            r.iter()
                .filter(|r| r.denominator != 0)
                .map(|r| r.numerator / r.denominator)
                .collect()
        });
    let Some([hour, minute, second]) = parts.as_deref() else {
        warn!("GPS time stamp is not parseable; skipping timestamp");
        return Ok(None);
    };

    Ok(day
        .and_hms_opt(*hour, *minute, *second)
        .map(|naive| naive.and_utc()))
}

/// Assemble GPS information from the entries of a GPSInfo directory.
///
/// # Errors
/// - `GpsCoordinatesNotValid` for an unsupported version or a missing or
///   malformed coordinate
pub fn gps_info_from_entries(entries: &[Entry]) -> Result<GpsInfo, ExifError> {
    match first_value(entries, TAG_GPS_VERSION_ID) {
        Some(version) => {
            let version = version?;
            let bytes = version.as_bytes().unwrap_or_default();
            if !SUPPORTED_GPS_VERSIONS.iter().any(|v| v.as_slice() == bytes) {
                return Err(ExifError::GpsCoordinatesNotValid(format!(
                    "GPS version not supported: {bytes:?}"
                )));
            }
        }
        None => warn!("No GPS version tag (0x0000) found"),
    }

    Ok(GpsInfo {
        latitude: coordinate(entries, TAG_GPS_LATITUDE, TAG_GPS_LATITUDE_REF, "latitude")?,
        longitude: coordinate(entries, TAG_GPS_LONGITUDE, TAG_GPS_LONGITUDE_REF, "longitude")?,
        altitude: altitude(entries)?,
        timestamp: timestamp(entries)?,
    })
}
