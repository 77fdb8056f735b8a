//! Simulated long-running operations bound to the demo keys.

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::common::TaskHandle;

const STEP: Duration = Duration::from_millis(25);
const FETCH_DURATION: Duration = Duration::from_millis(1500);
const PUSH_DURATION: Duration = Duration::from_millis(700);
const PULL_DURATION: Duration = Duration::from_millis(900);

pub(super) fn fetch(task: &TaskHandle) -> Result<()> {
    simulate(task, FETCH_DURATION)
}

pub(super) fn push_rejected(task: &TaskHandle) -> Result<()> {
    simulate(task, PUSH_DURATION)?;
    anyhow::bail!("remote rejected push: non-fast-forward")
}

/// Blocks the calling thread, like a command run synchronously from the UI.
pub(super) fn pull() -> Result<()> {
    std::thread::sleep(PULL_DURATION);
    Ok(())
}

fn simulate(task: &TaskHandle, total: Duration) -> Result<()> {
    let deadline = Instant::now() + total;
    while Instant::now() < deadline {
        if task.is_cancelled() {
            anyhow::bail!("{} cancelled", task.id());
        }
        std::thread::sleep(STEP);
    }
    Ok(())
}
