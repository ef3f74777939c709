use crate::settings::Settings;
use std::io::Write;
use track_compare_lib::{ReportOutcome, Result, compare_files, report};

/// Compare the tracks named in `settings`, writing the report to `out`
///
/// The CSV table is only written when at least one pair matched.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn run<W: Write>(settings: &Settings, mut out: W) -> Result<ReportOutcome> {
    let config = settings.config();
    tracing::debug!(
        "Comparing {} against {} ({:?})",
        settings.test.display(),
        settings.baseline.display(),
        config
    );

    let comparison = compare_files(&settings.baseline, &settings.test, &config)?;
    let outcome = report::write_summary(&mut out, comparison.summary())?;

    if let (ReportOutcome::Matched(_), Some(csv_path)) = (outcome, &settings.csv_path) {
        report::write_csv_file(csv_path, comparison.pairs())?;
        writeln!(out, "CSV written to {}", csv_path.display())?;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;
    use track_compare_lib::DataError;

    const BASELINE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="37.1234567" lon="-122.7654321"><time>2024-05-01T12:00:00Z</time></trkpt>
    <trkpt lat="37.1235567" lon="-122.7654321"><time>2024-05-01T12:00:10Z</time></trkpt>
    <trkpt lat="37.1236567" lon="-122.7654321"><time>2024-05-01T12:00:20Z</time></trkpt>
  </trkseg></trk>
</gpx>"#;

    const TEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="37.1234567" lon="-122.7654321"><time>2024-05-01T12:00:01Z</time></trkpt>
    <trkpt lat="37.1235567" lon="-122.7654321"><time>2024-05-01T12:00:09Z</time></trkpt>
    <trkpt lat="37.1236567" lon="-122.7654321"><time>2024-05-01T12:00:26Z</time></trkpt>
  </trkseg></trk>
</gpx>"#;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("track-compare-cli-{}-{name}", std::process::id()))
    }

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = temp_path(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn settings(args: &[&str]) -> Settings {
        Settings::try_parse_from(std::iter::once("track-compare").chain(args.iter().copied()))
            .unwrap()
    }

    fn run_to_string(settings: &Settings) -> (Result<ReportOutcome>, String) {
        let mut out = Vec::new();
        let result = run(settings, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_time_match_report() {
        let baseline = write_temp("time-base.gpx", BASELINE);
        let test = write_temp("time-test.gpx", TEST);

        let settings = settings(&[
            "--match",
            "time",
            "--epsilon-sec",
            "5",
            baseline.to_str().unwrap(),
            test.to_str().unwrap(),
        ]);
        let (result, stdout) = run_to_string(&settings);
        std::fs::remove_file(&baseline).unwrap();
        std::fs::remove_file(&test).unwrap();

        assert_eq!(result.unwrap(), ReportOutcome::Matched(2));
        assert_eq!(
            stdout,
            "Matched: 2\nMedian: 0.00 m\nP90: 0.00 m\nMax: 0.00 m\nMean: 0.00 m\n"
        );
    }

    #[test]
    fn test_csv_export() {
        let baseline = write_temp("csv-base.gpx", BASELINE);
        let test = write_temp("csv-test.gpx", TEST);
        let csv = temp_path("errors.csv");

        let settings = settings(&[
            "--csv",
            csv.to_str().unwrap(),
            baseline.to_str().unwrap(),
            test.to_str().unwrap(),
        ]);
        let (result, stdout) = run_to_string(&settings);
        let written = std::fs::read_to_string(&csv).unwrap();
        for path in [&baseline, &test, &csv] {
            std::fs::remove_file(path).unwrap();
        }

        assert_eq!(result.unwrap(), ReportOutcome::Matched(2));
        assert_eq!(stdout.lines().count(), 6);
        assert_eq!(
            stdout.lines().last().unwrap(),
            format!("CSV written to {}", csv.display())
        );
        assert_eq!(
            written,
            "timestamp,lat,lon,error_m\n\
             2024-05-01T12:00:00Z,37.1234567,-122.7654321,0.000\n\
             2024-05-01T12:00:10Z,37.1235567,-122.7654321,0.000\n"
        );
    }

    #[test]
    fn test_nearest_match_report() {
        let baseline = write_temp("nearest-base.gpx", BASELINE);
        let settings = settings(&[
            "--match",
            "nearest",
            baseline.to_str().unwrap(),
            baseline.to_str().unwrap(),
        ]);
        let (result, stdout) = run_to_string(&settings);
        std::fs::remove_file(&baseline).unwrap();

        assert_eq!(result.unwrap(), ReportOutcome::Matched(3));
        assert!(stdout.starts_with("Matched: 3\n"));
    }

    #[test]
    fn test_no_matches_reports_and_skips_csv() {
        let baseline = write_temp("none-base.gpx", BASELINE);
        let test = write_temp("none-test.gpx", TEST);
        let csv = temp_path("none.csv");

        let settings = settings(&[
            "--epsilon-sec",
            "0",
            "--csv",
            csv.to_str().unwrap(),
            baseline.to_str().unwrap(),
            test.to_str().unwrap(),
        ]);
        let (result, stdout) = run_to_string(&settings);
        std::fs::remove_file(&baseline).unwrap();
        std::fs::remove_file(&test).unwrap();

        assert_eq!(result.unwrap(), ReportOutcome::NoMatches);
        assert_eq!(stdout, "No matched points found.\n");
        assert!(!csv.exists());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let baseline = write_temp("missing-base.gpx", BASELINE);
        let missing = temp_path("missing-test.gpx");
        let settings = settings(&[baseline.to_str().unwrap(), missing.to_str().unwrap()]);

        let (result, stdout) = run_to_string(&settings);
        std::fs::remove_file(&baseline).unwrap();

        assert!(matches!(result, Err(DataError::ReadFile { .. })));
        assert!(stdout.is_empty());
    }

    #[test]
    fn test_reads_track_written_by_gpx_crate() {
        use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};

        let mut segment = TrackSegment::default();
        segment
            .points
            .push(Waypoint::new((-122.7654321, 37.1234567).into()));
        let mut track = Track::default();
        track.segments.push(segment);
        let gpx = Gpx {
            version: GpxVersion::Gpx11,
            tracks: vec![track],
            ..Default::default()
        };
        let path = temp_path("gpx-crate.gpx");
        gpx::write(&gpx, std::fs::File::create(&path).unwrap()).unwrap();

        let settings = settings(&[
            "--match",
            "nearest",
            path.to_str().unwrap(),
            path.to_str().unwrap(),
        ]);
        let (result, stdout) = run_to_string(&settings);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(result.unwrap(), ReportOutcome::Matched(1));
        assert!(stdout.contains("Max: 0.00 m\n"));
    }
}
