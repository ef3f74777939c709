//! Comparison - Top-level driver for a baseline/test comparison run
//!
//! This module ties parsing, matching and summarizing together and holds the
//! configuration that selects the matching strategy.

use crate::{
    MatchStrategy, MatchedPair, Matcher, NearestMatcher, Result, SummaryStatistics,
    TimeWindowMatcher, Track,
};
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default tolerance of the time-windowed strategy in seconds
pub const DEFAULT_EPSILON_SEC: f64 = 5.0;

/// Which matching strategy to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Strategy {
    /// Nearest test point in time, within `epsilon_sec`
    #[default]
    Time,
    /// Nearest test point in space, time is ignored
    Nearest,
}

/// Configuration of a comparison run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Matching strategy (default: time)
    pub strategy: Strategy,
    /// Maximum time delta in seconds for the time strategy (default 5.0).
    /// Ignored by the nearest strategy.
    pub epsilon_sec: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            epsilon_sec: DEFAULT_EPSILON_SEC,
        }
    }
}

impl Config {
    /// Build the matcher selected by this configuration
    pub fn matcher(&self) -> Matcher {
        match self.strategy {
            Strategy::Time => TimeWindowMatcher::new(self.epsilon_sec).into(),
            Strategy::Nearest => NearestMatcher.into(),
        }
    }
}

/// Result of comparing a baseline track with a test track
#[derive(Debug, Clone)]
pub struct Comparison {
    pairs: Vec<MatchedPair>,
    summary: SummaryStatistics,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Comparison {
    /// Match the two tracks with `strategy` and summarize the distances
    pub fn run<S: MatchStrategy + ?Sized>(baseline: &Track, test: &Track, strategy: &S) -> Self {
        #[cfg(feature = "profiling")]
        profiling::scope!("comparison::run");

        let pairs = strategy.match_tracks(baseline, test);
        let summary = SummaryStatistics::from_pairs(&pairs);
        tracing::debug!(
            "Compared {} baseline points with {} test points: {} matched",
            baseline.len(),
            test.len(),
            summary.count
        );
        Self { pairs, summary }
    }

    /// Matched pairs in the order produced by the strategy
    #[inline]
    pub fn pairs(&self) -> &[MatchedPair] {
        &self.pairs
    }

    #[inline]
    pub fn summary(&self) -> &SummaryStatistics {
        &self.summary
    }

    /// True when no baseline point found a partner
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Parse both track files and compare them according to `config`
pub fn compare_files(
    baseline: impl AsRef<Path>,
    test: impl AsRef<Path>,
    config: &Config,
) -> Result<Comparison> {
    let baseline = Track::from_path(baseline)?;
    let test = Track::from_path(test)?;
    Ok(Comparison::run(&baseline, &test, &config.matcher()))
}
