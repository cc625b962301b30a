//! Serde support for stored timestamps.
//!
//! Timestamps are written as RFC 3339 UTC strings carrying exactly as many
//! fractional digits as the value needs, so a save/load cycle is lossless.
//! Reading is more lenient: besides RFC 3339 with any offset, integer or
//! fractional Unix epoch milliseconds are accepted, since that is the other
//! shape a timestamp commonly takes once it has passed through JSON.
//!
//! Use with `#[serde(with = "crate::timestamp")]`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer, de};

/// Format a timestamp the way it is stored
#[must_use]
pub fn format(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse an RFC 3339 timestamp, normalizing its offset to UTC
///
/// # Errors
///
/// Returns the chrono parse error when `raw` is not RFC 3339.
pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw.trim()).map(|at| at.with_timezone(&Utc))
}

/// Serialize as an RFC 3339 string
///
/// # Errors
///
/// Propagates serializer errors.
pub fn serialize<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(at))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Stored {
    Text(String),
    Millis(i64),
    FractionalMillis(f64),
}

/// Deserialize from an RFC 3339 string or epoch milliseconds
///
/// # Errors
///
/// Fails on any other JSON shape, on unparseable strings, and on
/// millisecond values outside chrono's representable range.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match Stored::deserialize(deserializer)? {
        Stored::Text(raw) => parse(&raw).map_err(|error| {
            de::Error::custom(format_args!("invalid timestamp {raw:?}: {error}"))
        }),
        Stored::Millis(millis) => DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| de::Error::custom(format_args!("timestamp {millis}ms out of range"))),
        Stored::FractionalMillis(millis) => from_fractional_millis(millis)
            .ok_or_else(|| de::Error::custom(format_args!("timestamp {millis}ms out of range"))),
    }
}

#[allow(clippy::cast_possible_truncation)] // range is checked before the cast
fn from_fractional_millis(millis: f64) -> Option<DateTime<Utc>> {
    let micros = (millis * 1000.0).round();
    if !micros.is_finite() || micros.abs() >= 9.2e18 {
        return None;
    }
    DateTime::from_timestamp_micros(micros as i64)
}
