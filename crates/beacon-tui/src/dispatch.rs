//! Execution dispatcher: worker contexts and the UI-rendering context.
//!
//! Workers are tokio tasks. The UI context is a FIFO job queue with exactly
//! one consumer, [`UiQueue`], owned by whichever thread draws the screen.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::common::{TaskHandle, TaskId, TaskSeq};

/// A unit of work for the UI-rendering context.
pub type UiJob = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

/// Schedules work onto workers or onto the UI queue.
#[derive(Clone)]
pub struct Dispatcher {
    runtime: Handle,
    ui_tx: mpsc::UnboundedSender<UiJob>,
    root: CancellationToken,
    seq: Arc<TaskSeq>,
}

impl Dispatcher {
    /// Creates a dispatcher spawning onto `runtime`, plus the receiving end of
    /// its UI queue.
    pub fn new(runtime: Handle) -> (Self, UiQueue) {
        let (ui_tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            runtime,
            ui_tx,
            root: CancellationToken::new(),
            seq: Arc::new(TaskSeq::default()),
        };
        (dispatcher, UiQueue { rx })
    }

    /// Creates a handle cancelled by [`Dispatcher::shutdown`].
    pub fn new_task(&self) -> TaskHandle {
        TaskHandle::new(self.seq.next_id(), self.root.child_token())
    }

    /// Runs blocking work on a worker thread.
    pub fn on_worker<F>(&self, f: F) -> TaskId
    where
        F: FnOnce(TaskHandle) + Send + 'static,
    {
        let task = self.new_task();
        let id = task.id();
        debug!(event = "tui.dispatch.worker_started", task = %id);
        self.runtime.spawn_blocking(move || f(task));
        id
    }

    /// Runs a timer-driven future on the worker pool.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.runtime.spawn(future);
    }

    /// Queues `f` for the UI-rendering context.
    pub fn on_ui_thread<F>(&self, f: F)
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        if self.ui_tx.send(Box::new(f)).is_err() {
            debug!(event = "tui.dispatch.ui_queue_closed");
        }
    }

    /// Cancels every task handle handed out so far.
    pub fn shutdown(&self) {
        self.root.cancel();
    }
}

/// Single consumer of UI jobs.
pub struct UiQueue {
    rx: mpsc::UnboundedReceiver<UiJob>,
}

impl UiQueue {
    /// Runs every queued job without blocking. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            run_job(job);
            ran += 1;
        }
        ran
    }

    /// Runs jobs until every [`Dispatcher`] clone is dropped.
    ///
    /// Blocks the current thread; must not be called from async code.
    pub fn run_until_closed(mut self) {
        while let Some(job) = self.rx.blocking_recv() {
            run_job(job);
        }
    }
}

fn run_job(job: UiJob) {
    if let Err(err) = job() {
        warn!(event = "tui.dispatch.ui_job_failed", error = %format!("{err:#}"));
    }
}
