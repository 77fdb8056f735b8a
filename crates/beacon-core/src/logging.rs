//! Process-wide tracing setup.
//!
//! The TUI owns stdout/stderr, so events go to `$BEACON_HOME/logs/beacon.log`
//! through a non-blocking appender.

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogConfig, paths};

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "BEACON_LOG";

/// Initializes logging for the process.
///
/// Keep the returned guard alive until exit; dropping it flushes pending lines.
///
/// # Errors
/// Returns an error if the log directory cannot be created, the filter is
/// invalid, or a global subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<WorkerGuard> {
    let dir = paths::logs_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, "beacon.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_names(true),
        )
        .with(build_filter(config)?)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

fn build_filter(config: &LogConfig) -> Result<EnvFilter> {
    match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .with_context(|| format!("Invalid {LOG_ENV} filter: {directives}")),
        _ => EnvFilter::try_new(&config.filter)
            .with_context(|| format!("Invalid log filter: {}", config.filter)),
    }
}
