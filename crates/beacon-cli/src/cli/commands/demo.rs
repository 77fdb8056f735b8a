//! Interactive demo handler.

use anyhow::{Context, Result};
use beacon_core::config::Config;
use beacon_core::logging;
use tracing::info;

pub fn run(config: &Config, integration_test: bool) -> Result<()> {
    // Held until exit so buffered log lines are flushed.
    let _log_guard = logging::init(&config.log).context("init logging")?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .thread_name("beacon-worker")
        .enable_all()
        .build()
        .context("create tokio runtime")?;

    info!(event = "cli.demo.started", integration_test);
    let result = beacon_tui::run_interactive(config, rt.handle().clone(), integration_test);
    rt.shutdown_background();
    result
}
