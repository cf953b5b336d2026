//! Shared pieces for CLI commands

use crate::cli::args::OutputFormat;
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

/// Set up structured logging on stderr.
///
/// `RUST_LOG` wins over the level derived from the command-line flags.
pub fn setup_logging(log_level: &str, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gmet_import={}", log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    let initialized = if quiet {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    // A second init only happens in tests that run several commands
    if initialized.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
}

/// Print a serializable report as pretty JSON on stdout
pub fn print_json<T: Serialize>(report: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}

pub fn is_json(format: OutputFormat) -> bool {
    format == OutputFormat::Json
}

/// Format a duration in seconds for the summaries
pub fn format_elapsed(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{:.1}s", seconds)
    } else {
        let whole = seconds.round() as u64;
        format!("{}m {:02}s", whole / 60, whole % 60)
    }
}
