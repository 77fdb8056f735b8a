use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use beacon_core::status::StatusRegistry;
use tracing::{debug, warn};

use super::render_loop::{self, ObserverSlot};
use super::stop::{StopHandle, stop_signal};
use crate::common::{TaskHandle, TaskId};
use crate::dispatch::Dispatcher;
use crate::freeze::FreezeGate;
use crate::host::{HostUi, Region};

struct Shared {
    registry: Arc<dyn StatusRegistry>,
    host: Arc<dyn HostUi>,
    dispatcher: Dispatcher,
    freeze: FreezeGate,
    observer: ObserverSlot,
    loop_seq: AtomicU64,
}

/// Public entry point for toasts and waiting statuses.
///
/// Cheap to clone; clones share the same registry, host and render state.
#[derive(Clone)]
pub struct AppStatus {
    shared: Arc<Shared>,
}

impl AppStatus {
    pub fn new(
        registry: Arc<dyn StatusRegistry>,
        host: Arc<dyn HostUi>,
        dispatcher: Dispatcher,
    ) -> Self {
        let freeze = FreezeGate::new(Arc::clone(&host));
        Self {
            shared: Arc::new(Shared {
                registry,
                host,
                dispatcher,
                freeze,
                observer: ObserverSlot::default(),
                loop_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Shows a self-expiring notification.
    ///
    /// Skipped entirely under integration tests, where toasts only add
    /// timing noise.
    pub fn toast(&self, message: &str) {
        if self.shared.host.is_running_under_test() {
            return;
        }

        self.shared.registry.add_toast(message);
        self.render_until_empty();
    }

    /// Runs `f` on a worker while `message` is shown as a waiting status.
    ///
    /// Returns immediately. A failure is reported on the UI thread.
    pub fn with_waiting_status<F>(&self, message: impl Into<String>, f: F) -> TaskId
    where
        F: FnOnce(TaskHandle) -> Result<()> + Send + 'static,
    {
        let message = message.into();
        let this = self.clone();
        self.shared.dispatcher.on_worker(move |task| {
            let shared = &this.shared;
            let task_id = task.id();
            shared.registry.run_under_waiting_status(
                &message,
                Box::new(|| {
                    this.render_until_empty();

                    if let Err(err) = f(task) {
                        warn!(
                            event = "tui.status.operation_failed",
                            task = %task_id,
                            status = %message,
                            error = %format!("{err:#}")
                        );
                        let host = Arc::clone(&shared.host);
                        shared
                            .dispatcher
                            .on_ui_thread(move || host.report_error(err));
                    }
                }),
            );
        })
    }

    /// Runs `f` on the calling thread while `message` is shown as a waiting
    /// status, keeping the status line painted even though the caller (usually
    /// the UI thread) is blocked.
    ///
    /// The freeze flag is held and a dedicated render loop runs for the
    /// duration of `f`; both are torn down on every exit path, including a
    /// panic in `f`. Once the waiting entry is gone the status region is
    /// repainted from the registry. A failure is reported on the calling
    /// thread.
    ///
    /// Concurrent callers are serialized; a nested call from inside `f` runs
    /// under the outer freeze. Must not be called from async code.
    pub fn with_waiting_status_sync<F>(&self, message: &str, f: F)
    where
        F: FnOnce() -> Result<()>,
    {
        let shared = &self.shared;
        let _refresh = RefreshOnExit(self);
        shared.registry.run_under_waiting_status(
            message,
            Box::new(|| {
                // Makes the bottom line appear even if the layout currently hides it.
                if let Err(err) = shared.host.force_full_redraw() {
                    debug!(event = "tui.status.redraw_failed", error = %format!("{err:#}"));
                }

                let freeze = shared.freeze.acquire();
                let session = self.start_sync_loop();

                let result = f();

                session.stop();
                drop(freeze);

                if let Err(err) = result {
                    warn!(
                        event = "tui.status.operation_failed",
                        status = %message,
                        error = %format!("{err:#}")
                    );
                    if let Err(report_err) = shared.host.report_error(err) {
                        warn!(
                            event = "tui.status.report_failed",
                            error = %format!("{report_err:#}")
                        );
                    }
                }
            }),
        );
    }

    pub fn has_status(&self) -> bool {
        self.shared.registry.has_status()
    }

    /// The registry's display string, without the paint-time prefix.
    pub fn status_string(&self) -> String {
        self.shared.registry.status_string()
    }

    /// Paints the current display string and hands any remaining entries to
    /// an async loop.
    fn refresh(&self) {
        let shared = &self.shared;
        let status = shared.registry.status_string();
        shared
            .host
            .set_region_content(Region::AppStatus, &render_loop::status_text(&status));
        if shared.registry.has_status() {
            self.render_until_empty();
        }
    }

    fn next_loop_id(&self) -> u64 {
        self.shared.loop_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn render_until_empty(&self) {
        let shared = &self.shared;
        if !shared.observer.try_claim() {
            return;
        }

        shared.dispatcher.spawn(render_loop::render_until_empty(
            Arc::clone(&shared.registry),
            Arc::clone(&shared.host),
            shared.dispatcher.clone(),
            shared.observer.clone(),
            self.next_loop_id(),
        ));
    }

    fn start_sync_loop(&self) -> StopHandle {
        let shared = &self.shared;
        let (handle, listener) = stop_signal();
        shared.dispatcher.spawn(render_loop::render_until_stopped(
            Arc::clone(&shared.registry),
            Arc::clone(&shared.host),
            listener,
            self.next_loop_id(),
        ));
        handle
    }

    #[cfg(test)]
    fn render_loops_started(&self) -> u64 {
        self.shared.loop_seq.load(Ordering::Relaxed)
    }
}

/// Repaints the status region after a sync session, including on unwind.
struct RefreshOnExit<'a>(&'a AppStatus);

impl Drop for RefreshOnExit<'_> {
    fn drop(&mut self) {
        self.0.refresh();
    }
}
