//! Console logging for the converter.

mod formatter;
mod helpers;

pub use helpers::{log_batch_summary, log_conversion_complete, log_conversion_start};

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::utils::{Error, Result};
use formatter::CleanFormatter;

/// Installs the global subscriber. `RUST_LOG` overrides `level` when set.
///
/// ```no_run
/// use hdr_converter::utils::logging::setup_logging;
///
/// setup_logging("info", false, true).expect("Failed to setup logging");
/// ```
pub fn setup_logging(level: &str, show_timestamps: bool, colored: bool) -> Result<()> {
    let level = parse_level(level);

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(false)
        .with_writer(std::io::stderr)
        .event_format(CleanFormatter::new(show_timestamps, colored));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::validation(format!("Failed to initialise logging: {}", e)))
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
