mod logging;
mod run;
mod settings;

use settings::Settings;
use std::process::ExitCode;
use track_compare_lib::ReportOutcome;

fn main() -> ExitCode {
    let settings = Settings::from_cli();
    logging::setup_logging(settings.verbose);

    match run::run(&settings, std::io::stdout().lock()) {
        Ok(ReportOutcome::Matched(_)) => ExitCode::SUCCESS,
        Ok(ReportOutcome::NoMatches) => ExitCode::FAILURE,
        Err(err) => {
            tracing::debug!("Comparison failed: {err:?}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
