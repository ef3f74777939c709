//! Order statistics over per-pair distances

use crate::MatchedPair;

/// Descriptive statistics of matched-pair distances, all in meters
///
/// When `count` is zero every other field is NaN; check [`is_empty`] before
/// formatting.
///
/// [`is_empty`]: SummaryStatistics::is_empty
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SummaryStatistics {
    pub count: usize,
    pub median: f64,
    /// 90th percentile, nearest-rank method
    pub p90: f64,
    pub max: f64,
    pub mean: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl SummaryStatistics {
    /// Summarize a list of non-negative distances
    pub fn from_distances(distances: &[f64]) -> Self {
        let count = distances.len();
        if count == 0 {
            return Self {
                count,
                median: f64::NAN,
                p90: f64::NAN,
                max: f64::NAN,
                mean: f64::NAN,
            };
        }

        let mut sorted = distances.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mid = count / 2;
        let median = if count % 2 == 1 {
            sorted[mid]
        } else {
            0.5 * (sorted[mid - 1] + sorted[mid])
        };

        Self {
            count,
            median,
            p90: percentile(&sorted, 90.0),
            max: sorted[count - 1],
            mean: sorted.iter().sum::<f64>() / count as f64,
        }
    }

    /// Summarize the distances of matched pairs
    pub fn from_pairs(pairs: &[MatchedPair]) -> Self {
        let distances: Vec<f64> = pairs.iter().map(|pair| pair.distance_m).collect();
        Self::from_distances(&distances)
    }

    /// True when no distances were summarized
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Nearest-rank percentile of an ascending slice
///
/// `pct <= 0` yields the minimum and `pct >= 100` the maximum. Otherwise the
/// value at rank `ceil(pct / 100 * n) - 1` is returned, without interpolation.
/// An empty slice yields NaN.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let (Some(&first), Some(&last)) = (sorted.first(), sorted.last()) else {
        return f64::NAN;
    };
    if pct <= 0.0 {
        return first;
    }
    if pct >= 100.0 {
        return last;
    }
    let rank = (pct / 100.0 * sorted.len() as f64).ceil() as isize - 1;
    sorted[rank.clamp(0, sorted.len() as isize - 1) as usize]
}
