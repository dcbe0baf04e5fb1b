//! Logging bootstrap for harness runs.

use crate::config::{HarnessConfig, LogFormat};
use crate::{Error, Result};

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Install the global `tracing` subscriber for a harness run.
///
/// Output goes through the libtest writer so it is captured per test.
/// Returns `Ok(false)` when a subscriber was already installed, which is
/// the normal case for every test after the first in a binary.
pub fn init_tracing(config: &HarnessConfig) -> Result<bool> {
    let level = parse_log_level(&config.log_level)?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_test_writer();

    let installed = match config.log_format {
        LogFormat::Text => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };

    if installed {
        info!(
            base_url = %config.base_url,
            verify_tls = config.verify_tls,
            timeout_secs = config.timeout.as_secs(),
            "Harness logging initialized"
        );
    }

    Ok(installed)
}

pub(crate) fn parse_log_level(raw: &str) -> Result<Level> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(Error::Config(format!(
            "invalid log level '{other}', expected one of [trace, debug, info, warn, error]"
        ))),
    }
}
