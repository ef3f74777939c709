//! Timestamped geographic point

use crate::utils;
use geo::Point;
use time::{OffsetDateTime, UtcOffset};

/// A single recorded position, optionally timestamped
///
/// The epoch seconds are derived from the timestamp on construction, so a point
/// carries either both or neither. Points without a timestamp can still be
/// matched spatially but never by time.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GeoPoint {
    /// Position in degrees (x = longitude, y = latitude)
    position: Point<f64>,
    /// Recording instant, normalized to UTC
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339::option"))]
    timestamp: Option<OffsetDateTime>,
    /// Cached seconds since the Unix epoch for fast comparisons
    epoch_seconds: Option<f64>,
}

impl GeoPoint {
    /// Create a point, normalizing the timestamp (if any) to UTC
    pub fn new(lat: f64, lon: f64, timestamp: Option<OffsetDateTime>) -> Self {
        let timestamp = timestamp.map(|t| t.to_offset(UtcOffset::UTC));
        Self {
            position: Point::new(lon, lat),
            timestamp,
            epoch_seconds: timestamp.map(utils::epoch_seconds),
        }
    }

    /// Create a point without time information
    #[inline]
    pub fn untimed(lat: f64, lon: f64) -> Self {
        Self::new(lat, lon, None)
    }

    #[inline]
    pub fn lat(&self) -> f64 {
        self.position.y()
    }

    #[inline]
    pub fn lon(&self) -> f64 {
        self.position.x()
    }

    /// Position as a `geo` point (x = longitude, y = latitude)
    #[inline]
    pub fn position(&self) -> Point<f64> {
        self.position
    }

    #[inline]
    pub fn timestamp(&self) -> Option<OffsetDateTime> {
        self.timestamp
    }

    #[inline]
    pub fn epoch_seconds(&self) -> Option<f64> {
        self.epoch_seconds
    }

    /// Great-circle distance to another point in meters
    #[inline]
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        utils::haversine_distance(self.lat(), self.lon(), other.lat(), other.lon())
    }
}
