//! Polling loops that paint the registry's display string.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use beacon_core::status::StatusRegistry;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use super::stop::StopListener;
use crate::dispatch::Dispatcher;
use crate::host::{HostUi, Region};

/// Cadence of every render loop.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Regions flushed out-of-band by the synchronous loop.
const SYNC_REDRAW_REGIONS: [Region; 2] = [Region::AppStatus, Region::Options];

/// Text written to the status region for a display string.
pub fn status_text(status: &str) -> String {
    format!(" {status}")
}

/// Marks whether an async loop is currently observing the registry.
#[derive(Debug, Clone, Default)]
pub(crate) struct ObserverSlot(Arc<AtomicBool>);

impl ObserverSlot {
    /// Returns true if the caller became the observer.
    pub(crate) fn try_claim(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    fn release(&self) {
        self.0.store(false, Ordering::Release);
    }

    #[cfg(test)]
    pub(crate) fn is_claimed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Paints through the UI queue until the registry reports an empty string.
///
/// The caller must have claimed `slot`; it is released on exit.
pub(crate) async fn render_until_empty(
    registry: Arc<dyn StatusRegistry>,
    host: Arc<dyn HostUi>,
    dispatcher: Dispatcher,
    slot: ObserverSlot,
    loop_id: u64,
) {
    debug!(event = "tui.status.render_loop_started", loop_id, mode = "async");
    let mut ticker = time::interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let status = registry.status_string();
        let text = status_text(&status);
        let painter = Arc::clone(&host);
        dispatcher.on_ui_thread(move || {
            painter.set_region_content(Region::AppStatus, &text);
            Ok(())
        });

        if status.is_empty() {
            slot.release();
            // An entry pushed between the read and the release saw the slot
            // taken and did not start a loop of its own.
            if registry.has_status() && slot.try_claim() {
                continue;
            }
            break;
        }
    }

    debug!(event = "tui.status.render_loop_stopped", loop_id, mode = "async");
}

/// Paints directly and flushes until `stop` fires.
pub(crate) async fn render_until_stopped(
    registry: Arc<dyn StatusRegistry>,
    host: Arc<dyn HostUi>,
    stop: StopListener,
    loop_id: u64,
) {
    debug!(event = "tui.status.render_loop_started", loop_id, mode = "sync");
    let mut ticker = time::interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = stop.stopped() => break,
            _ = ticker.tick() => {
                let status = registry.status_string();
                host.set_region_content(Region::AppStatus, &status_text(&status));
                if let Err(err) = host.force_region_redraw(&SYNC_REDRAW_REGIONS) {
                    debug!(
                        event = "tui.status.redraw_failed",
                        loop_id,
                        error = %format!("{err:#}")
                    );
                }
            }
        }
    }

    drop(ticker);
    debug!(event = "tui.status.render_loop_stopped", loop_id, mode = "sync");
    drop(stop);
}
