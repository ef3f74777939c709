//! Track Compare Library - Horizontal error between two recorded GPS tracks
//!
//! Given a trusted baseline track and a track under test, this library pairs
//! corresponding points and summarizes the great-circle distance between them.
//!
//! # Architecture
//!
//! - **[`Track`]**: Tolerant GPX parsing into an ordered list of [`GeoPoint`]s
//! - **[`utils::haversine_distance`]**: Great-circle distance on a 6371 km sphere
//! - **[`MatchStrategy`]**: Pairing by time window ([`TimeWindowMatcher`]) or by
//!   spatial proximity ([`NearestMatcher`])
//! - **[`SummaryStatistics`]**: Count, median, P90, max and mean of the distances
//! - **[`report`]**: Five-line text summary and per-point CSV export
//! - **[`Comparison`]**: Runs the whole pipeline for one baseline/test pair
//!
//! # Example
//!
//! ```rust
//! use track_compare_lib::{Comparison, GeoPoint, NearestMatcher, Track};
//!
//! let baseline = Track::from_points(vec![GeoPoint::untimed(51.5074, -0.1278)]);
//! let test = Track::from_points(vec![GeoPoint::untimed(51.5075, -0.1278)]);
//!
//! let comparison = Comparison::run(&baseline, &test, &NearestMatcher);
//! assert_eq!(comparison.summary().count, 1);
//! assert!((comparison.summary().max - 11.1).abs() < 0.1);
//! ```

mod comparison;
mod matcher;
mod point;
pub mod report;
mod summary;
mod track;
pub mod utils;

// Public API exports
pub use comparison::{Comparison, Config, DEFAULT_EPSILON_SEC, Strategy, compare_files};
pub use matcher::{MatchStrategy, MatchedPair, Matcher, NearestMatcher, TimeWindowMatcher};
pub use point::GeoPoint;
pub use report::ReportOutcome;
pub use summary::{SummaryStatistics, percentile};
pub use track::Track;

use std::path::PathBuf;

/// Error types for track comparison
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("GPX parsing error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("Timestamp formatting error: {0}")]
    TimeFormat(#[from] time::error::Format),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty track: no track point with usable coordinates")]
    EmptyTrack,
}

pub type Result<T> = std::result::Result<T, DataError>;
