//! # Timestamps
//!
//! Appointment times are stored as naive (zone-less) timestamps.
//!
//! ## Accepted Input
//! ```text
//! 2024-01-01T10:00:00.000Z      RFC 3339 with offset → converted to UTC
//! 2024-01-01T10:00:00+01:00     RFC 3339 with offset → converted to UTC
//! 2024-01-01T10:00Z             offset without seconds → converted to UTC
//! 2024-01-01T10:00:00.250       ISO without offset
//! 2024-01-01T10:30              datetime-local form value (no seconds)
//! 2024-01-01 10:30:00           space separator
//! 2024-01-01                    bare date → midnight
//! ```
//!
//! Output is always `YYYY-MM-DDTHH:MM:SS` with fractional seconds only when
//! they are non-zero.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{de, Deserialize, Deserializer, Serializer};

use crate::error::ValidationError;
use crate::patch::Patch;

const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

// Minute precision with an offset; a trailing `Z` is rewritten to +00:00.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%#z", "%Y-%m-%d %H:%M%#z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a timestamp in any of the accepted input forms.
///
/// ## Example
/// ```rust
/// use termin_core::timestamp::parse;
///
/// let a = parse("2024-01-01T10:30").unwrap();
/// let b = parse("2024-01-01T10:30:00.000Z").unwrap();
/// assert_eq!(a, b);
/// assert!(parse("morgen früh").is_err());
/// ```
pub fn parse(input: &str) -> Result<NaiveDateTime, ValidationError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.naive_utc());
    }

    let zoned = match input.strip_suffix(['Z', 'z']) {
        Some(local) => format!("{local}+00:00"),
        None => input.to_string(),
    };
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&zoned, format) {
            return Ok(dt.naive_utc());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(ValidationError::invalid_format(
        "zeitpunkt",
        format!("'{input}' ist kein gültiger Zeitpunkt"),
    ))
}

/// Formats a timestamp for the wire.
pub fn format(value: &NaiveDateTime) -> String {
    value.format(OUTPUT_FORMAT).to_string()
}

// =============================================================================
// Serde Helpers
// =============================================================================

/// Serializer for `#[serde(with = "crate::timestamp")]`.
pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(value))
}

/// Deserializer for `#[serde(with = "crate::timestamp")]`.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(de::Error::custom)
}

/// Deserializer for optional timestamps in query strings.
///
/// An empty value counts as absent.
pub fn deserialize_option<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => parse(&raw).map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

/// Deserializer for timestamp fields of update requests.
pub fn deserialize_patch<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Patch<NaiveDateTime>, D::Error> {
    Patch::<String>::deserialize(deserializer)?
        .try_map(|raw| parse(&raw))
        .map_err(de::Error::custom)
}

// =============================================================================
// Unit Tests
// =============================================================================
