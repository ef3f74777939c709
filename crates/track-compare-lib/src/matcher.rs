//! Pairing of baseline points with points of the track under test
//!
//! Two strategies are provided behind the [`MatchStrategy`] trait:
//!
//! - [`TimeWindowMatcher`]: nearest test point in time, accepted only within a
//!   tolerance. Measures the simultaneous-position error.
//! - [`NearestMatcher`]: nearest test point in space, ignoring time. Measures
//!   the closest-approach error when clocks cannot be trusted.
//!
//! Baseline points that find no acceptable partner are dropped.

use crate::{GeoPoint, Track, utils};
use rayon::prelude::*;

/// One baseline point paired with its matched test point
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MatchedPair {
    pub baseline: GeoPoint,
    pub test: GeoPoint,
    /// Great-circle distance between the two points in meters
    pub distance_m: f64,
}

impl MatchedPair {
    /// Pair two points, computing their distance
    pub fn new(baseline: GeoPoint, test: GeoPoint) -> Self {
        Self {
            distance_m: baseline.distance_to(&test),
            baseline,
            test,
        }
    }

    /// Signed time offset of the test point relative to the baseline (seconds)
    ///
    /// Returns `None` unless both points are timed.
    pub fn time_delta(&self) -> Option<f64> {
        Some(self.test.epoch_seconds()? - self.baseline.epoch_seconds()?)
    }
}

/// A way of selecting, for each baseline point, at most one test point
pub trait MatchStrategy {
    /// Match every baseline point that has an acceptable partner in `test`
    fn match_tracks(&self, baseline: &Track, test: &Track) -> Vec<MatchedPair>;
}

/// Nearest-in-time matching bounded by a tolerance
///
/// Output is ordered by baseline time. When the two neighbours in time are
/// equally far from a baseline point, the later one (at the insertion position)
/// is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindowMatcher {
    epsilon_sec: f64,
}

impl TimeWindowMatcher {
    /// Create a matcher accepting pairs at most `epsilon_sec` seconds apart
    pub fn new(epsilon_sec: f64) -> Self {
        Self { epsilon_sec }
    }

    #[inline]
    pub fn epsilon_sec(&self) -> f64 {
        self.epsilon_sec
    }
}

/// Timed points of a track with their epoch seconds, stably sorted by time
fn timed_sorted(track: &Track) -> Vec<(f64, &GeoPoint)> {
    let mut timed: Vec<(f64, &GeoPoint)> = track
        .points()
        .iter()
        .filter_map(|p| Some((p.epoch_seconds()?, p)))
        .collect();
    timed.sort_by(|a, b| a.0.total_cmp(&b.0));
    timed
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl MatchStrategy for TimeWindowMatcher {
    fn match_tracks(&self, baseline_track: &Track, test_track: &Track) -> Vec<MatchedPair> {
        let baseline = timed_sorted(baseline_track);
        let test = timed_sorted(test_track);
        let untimed = (baseline_track.len() - baseline.len()) + (test_track.len() - test.len());
        if untimed > 0 {
            tracing::warn!("Ignoring {untimed} points without a usable timestamp");
        }
        if baseline.is_empty() || test.is_empty() {
            tracing::debug!(
                "Time matching skipped: {} timed baseline points, {} timed test points",
                baseline.len(),
                test.len()
            );
            return Vec::new();
        }

        let pairs: Vec<MatchedPair> = baseline
            .iter()
            .filter_map(|&(seconds, point)| {
                let index = test.partition_point(|&(t, _)| t < seconds);
                let at = test.get(index).map(|&(t, p)| ((t - seconds).abs(), p));
                let before = index
                    .checked_sub(1)
                    .map(|i| test[i])
                    .map(|(t, p)| ((t - seconds).abs(), p));

                let (delta, winner) = match (at, before) {
                    (Some(at), Some(before)) if before.0 < at.0 => before,
                    (Some(at), _) => at,
                    (None, before) => before?,
                };
                (delta <= self.epsilon_sec).then(|| MatchedPair::new(*point, *winner))
            })
            .collect();

        tracing::debug!(
            "Time matching (epsilon {} s) paired {} of {} timed baseline points",
            self.epsilon_sec,
            pairs.len(),
            baseline.len()
        );
        pairs
    }
}

/// Nearest-in-space matching over all test points
///
/// Output follows baseline file order. Among equally distant test points the
/// first one in file order wins. The scan is quadratic and runs in parallel
/// over baseline points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NearestMatcher;

/// A point with its trigonometry precomputed for repeated distance queries
struct RadianPoint<'a> {
    lat: f64,
    lon: f64,
    cos_lat: f64,
    point: &'a GeoPoint,
}

impl<'a> RadianPoint<'a> {
    fn new(point: &'a GeoPoint) -> Self {
        let lat = point.lat().to_radians();
        Self {
            lat,
            lon: point.lon().to_radians(),
            cos_lat: lat.cos(),
            point,
        }
    }

    #[inline(always)]
    fn distance_to(&self, other: &RadianPoint<'_>) -> f64 {
        utils::haversine_radians(
            self.lat,
            self.lon,
            self.cos_lat,
            other.lat,
            other.lon,
            other.cos_lat,
        )
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl MatchStrategy for NearestMatcher {
    fn match_tracks(&self, baseline: &Track, test: &Track) -> Vec<MatchedPair> {
        if baseline.is_empty() || test.is_empty() {
            return Vec::new();
        }

        let candidates: Vec<RadianPoint<'_>> =
            test.points().iter().map(RadianPoint::new).collect();

        let pairs: Vec<MatchedPair> = baseline
            .points()
            .par_iter()
            .filter_map(|point| {
                let origin = RadianPoint::new(point);
                let mut best_distance = f64::INFINITY;
                let mut best: Option<&GeoPoint> = None;
                for candidate in &candidates {
                    let distance = origin.distance_to(candidate);
                    // Strictly less: the first of several equal minima is kept
                    if distance < best_distance {
                        best_distance = distance;
                        best = Some(candidate.point);
                    }
                }
                best.map(|nearest| MatchedPair {
                    baseline: *point,
                    test: *nearest,
                    distance_m: best_distance,
                })
            })
            .collect();

        tracing::debug!(
            "Nearest matching paired {} of {} baseline points against {} test points",
            pairs.len(),
            baseline.len(),
            test.len()
        );
        pairs
    }
}

/// The matching strategy selected for a comparison run
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Matcher {
    Time(TimeWindowMatcher),
    Nearest(NearestMatcher),
}

impl MatchStrategy for Matcher {
    fn match_tracks(&self, baseline: &Track, test: &Track) -> Vec<MatchedPair> {
        match self {
            Matcher::Time(matcher) => matcher.match_tracks(baseline, test),
            Matcher::Nearest(matcher) => matcher.match_tracks(baseline, test),
        }
    }
}

impl From<TimeWindowMatcher> for Matcher {
    fn from(matcher: TimeWindowMatcher) -> Self {
        Matcher::Time(matcher)
    }
}

impl From<NearestMatcher> for Matcher {
    fn from(matcher: NearestMatcher) -> Self {
        Matcher::Nearest(matcher)
    }
}
