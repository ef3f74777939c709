//! Utility functions for great-circle distances and timestamp handling

use time::format_description::well_known::Iso8601;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Earth's mean radius in meters used for all haversine distances
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two (lat, lon) pairs in degrees
///
/// Uses the haversine formula on a sphere of radius [`EARTH_RADIUS_M`].
#[inline(always)]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    haversine_radians(
        lat1,
        lon1.to_radians(),
        lat1.cos(),
        lat2,
        lon2.to_radians(),
        lat2.cos(),
    )
}

/// Haversine distance for coordinates already converted to radians
///
/// Taking the latitude cosines as arguments lets callers that compare one point
/// against many hoist the trigonometry out of the inner loop.
#[inline(always)]
pub fn haversine_radians(
    lat1: f64,
    lon1: f64,
    cos_lat1: f64,
    lat2: f64,
    lon2: f64,
    cos_lat2: f64,
) -> f64 {
    let delta_lat = lat2 - lat1;
    let delta_lon = lon2 - lon1;

    let a = (delta_lat / 2.0).sin().powi(2) + cos_lat1 * cos_lat2 * (delta_lon / 2.0).sin().powi(2);

    // Rounding can push `a` slightly above 1.0 near antipodal points
    EARTH_RADIUS_M * 2.0 * a.sqrt().min(1.0).asin()
}

/// Parse an extended ISO-8601 timestamp into a UTC instant
///
/// A trailing `Z`/`z` is treated as `+00:00`, a space or lowercase `t` between
/// date and time is accepted, as are an hour-only clock and a space before the
/// offset. Values without an offset are assumed to be UTC. Returns `None`
/// when the text is empty or cannot be parsed.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    let mut normalized = match text.strip_suffix(['Z', 'z']) {
        Some(stripped) => format!("{stripped}+00:00"),
        None => text.to_string(),
    };
    if matches!(normalized.as_bytes().get(10), Some(b' ' | b't')) {
        normalized.replace_range(10..11, "T");
    }
    if normalized.as_bytes().get(10) == Some(&b'T') {
        if let Some(clock) = normalized.get(11..) {
            let clock = normalize_clock(clock);
            normalized.truncate(11);
            normalized.push_str(&clock);
        }
    }

    if let Ok(timestamp) = OffsetDateTime::parse(&normalized, &Iso8601::DEFAULT) {
        return Some(timestamp.to_offset(UtcOffset::UTC));
    }
    if let Ok(timestamp) = PrimitiveDateTime::parse(&normalized, &Iso8601::DEFAULT) {
        return Some(timestamp.assume_utc());
    }
    Date::parse(&normalized, &Iso8601::DEFAULT)
        .ok()
        .map(|date| date.midnight().assume_utc())
}

/// Pad an hour-only clock to `HH:00` and drop whitespace before the offset
fn normalize_clock(clock: &str) -> String {
    let (time, offset) = match clock.find(['+', '-']) {
        Some(index) => clock.split_at(index),
        None => (clock, ""),
    };
    let time = time.trim_end();
    if time.len() == 2 && time.bytes().all(|b| b.is_ascii_digit()) {
        format!("{time}:00{offset}")
    } else {
        format!("{time}{offset}")
    }
}

/// Format a timestamp in UTC with second precision and a literal `Z` suffix
///
/// Sub-second digits are truncated, e.g. `2024-05-01T12:00:00Z`.
pub fn format_utc_seconds(
    timestamp: OffsetDateTime,
) -> std::result::Result<String, time::error::Format> {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");
    timestamp.to_offset(UtcOffset::UTC).format(&format)
}

/// Seconds since the Unix epoch as a float, keeping sub-second precision
#[inline]
pub fn epoch_seconds(timestamp: OffsetDateTime) -> f64 {
    timestamp.unix_timestamp_nanos() as f64 / 1e9
}
