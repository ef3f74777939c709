//! Human-readable summary and per-point CSV export

use crate::{DataError, MatchedPair, Result, SummaryStatistics, utils};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Printed instead of statistics when nothing matched
pub const NO_MATCH_MESSAGE: &str = "No matched points found.";

/// Header row of the per-point CSV table
pub const CSV_HEADER: &str = "timestamp,lat,lon,error_m";

/// What [`write_summary`] reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Statistics were printed for this many matched pairs
    Matched(usize),
    /// Nothing matched; only [`NO_MATCH_MESSAGE`] was printed
    NoMatches,
}

/// Write the five-line summary block, or the no-match message
///
/// ```text
/// Matched: 2
/// Median: 1.50 m
/// P90: 2.00 m
/// Max: 2.00 m
/// Mean: 1.50 m
/// ```
pub fn write_summary<W: Write>(
    mut out: W,
    summary: &SummaryStatistics,
) -> io::Result<ReportOutcome> {
    if summary.is_empty() {
        writeln!(out, "{NO_MATCH_MESSAGE}")?;
        return Ok(ReportOutcome::NoMatches);
    }

    writeln!(out, "Matched: {}", summary.count)?;
    writeln!(out, "Median: {:.2} m", summary.median)?;
    writeln!(out, "P90: {:.2} m", summary.p90)?;
    writeln!(out, "Max: {:.2} m", summary.max)?;
    writeln!(out, "Mean: {:.2} m", summary.mean)?;
    Ok(ReportOutcome::Matched(summary.count))
}

/// Write one CSV row per matched pair, preceded by [`CSV_HEADER`]
///
/// Columns are the baseline timestamp (UTC, second precision, empty when the
/// point is untimed), baseline latitude and longitude with 7 decimals and the
/// distance in meters with 3 decimals.
pub fn write_csv<W: Write>(mut out: W, pairs: &[MatchedPair]) -> Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for pair in pairs {
        let timestamp = match pair.baseline.timestamp() {
            Some(timestamp) => utils::format_utc_seconds(timestamp)?,
            None => String::new(),
        };
        writeln!(
            out,
            "{},{:.7},{:.7},{:.3}",
            timestamp,
            pair.baseline.lat(),
            pair.baseline.lon(),
            pair.distance_m
        )?;
    }
    Ok(())
}

/// Create (or truncate) `path` and write the CSV table into it
pub fn write_csv_file(path: impl AsRef<Path>, pairs: &[MatchedPair]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| DataError::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;
    let write_error = |source| DataError::WriteFile {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(file);
    write_csv(&mut writer, pairs).map_err(|err| match err {
        DataError::Io(source) => write_error(source),
        other => other,
    })?;
    writer.flush().map_err(write_error)?;
    tracing::debug!("Wrote {} CSV rows to {}", pairs.len(), path.display());
    Ok(())
}
