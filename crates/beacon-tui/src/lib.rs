//! Full-screen TUI and transient status line for beacon.

pub mod common;
pub mod dispatch;
pub mod freeze;
pub mod host;
pub mod render;
pub mod runtime;
pub mod screen;
pub mod status;
pub mod terminal;

#[cfg(test)]
mod testing;

use std::io::{IsTerminal, stdout};

use anyhow::Result;
use beacon_core::config::Config;
pub use runtime::TuiRuntime;
pub use status::AppStatus;
use tokio::runtime::Handle;

/// Runs the interactive status demo on the calling thread.
///
/// Workers are spawned onto `runtime`; the calling thread becomes the
/// UI-rendering context.
///
/// # Errors
/// Returns an error if stdout is not a terminal or terminal I/O fails.
pub fn run_interactive(config: &Config, runtime: Handle, under_test: bool) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!("beacon requires a terminal.");
    }

    let mut tui = TuiRuntime::new(config, runtime, under_test)?;
    tui.run()
}
