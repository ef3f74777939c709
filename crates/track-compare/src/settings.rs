use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use track_compare_lib::{Config, Strategy};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Track Compare - Horizontal error statistics between a baseline GPS track and a track under test
pub struct Settings {
    /// Baseline (trusted) GPX file
    #[clap(value_name = "BASELINE")]
    pub baseline: PathBuf,

    /// GPX file under test
    #[clap(value_name = "TEST")]
    pub test: PathBuf,

    /// Matching strategy: time (default) or nearest spatial
    #[clap(long = "match", value_enum, default_value = "time")]
    pub match_mode: MatchMode,

    /// Max time delta for --match time (seconds, `inf` for no limit)
    #[clap(long, default_value = "5.0", value_parser = parse_epsilon)]
    pub epsilon_sec: f64,

    /// Optional CSV output file with one row per matched point
    #[clap(long = "csv", value_name = "FILE")]
    pub csv_path: Option<PathBuf>,

    /// Log debug details to stderr (overridden by RUST_LOG)
    #[clap(short, long, default_value = "false")]
    pub verbose: bool,
}

/// Matching strategy as spelled on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Nearest point in time within --epsilon-sec
    Time,
    /// Nearest point in space, ignoring time
    Nearest,
}

impl From<MatchMode> for Strategy {
    fn from(mode: MatchMode) -> Self {
        match mode {
            MatchMode::Time => Strategy::Time,
            MatchMode::Nearest => Strategy::Nearest,
        }
    }
}

impl Settings {
    /// Parse settings from the process arguments, exiting on invalid usage
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Comparison configuration selected by these settings
    pub fn config(&self) -> Config {
        Config {
            strategy: self.match_mode.into(),
            epsilon_sec: self.epsilon_sec,
        }
    }
}

/// Accept non-negative tolerances; `inf` lifts the limit entirely
fn parse_epsilon(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if value.is_nan() || value < 0.0 {
        return Err(format!("`{raw}` must be a non-negative number of seconds"));
    }
    Ok(value)
}
