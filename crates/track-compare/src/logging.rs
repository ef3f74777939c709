use tracing_subscriber::prelude::*;

/// Initialize logging to stderr, keeping stdout for the report.
///
/// `RUST_LOG` takes precedence; otherwise only warnings are shown, or debug
/// output when `verbose` is set.
pub fn setup_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::debug!(
        "{} {} logging initialized",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
}

/// Filter used when `RUST_LOG` is not set
fn default_directives(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}
