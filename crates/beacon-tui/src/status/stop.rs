//! One-shot stop signal with exit acknowledgment.
//!
//! The handle closes a [`CancellationToken`] exactly once: either through
//! [`StopHandle::stop`] or when it is dropped. The listener acknowledges
//! when it is dropped, so the handle can wait for the loop to actually exit
//! without ever blocking on a loop that is already gone.

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Creates a connected handle/listener pair.
pub fn stop_signal() -> (StopHandle, StopListener) {
    let token = CancellationToken::new();
    let (exited_tx, exited_rx) = oneshot::channel();
    (
        StopHandle {
            token: token.clone(),
            exited: Some(exited_rx),
        },
        StopListener {
            token,
            exited: Some(exited_tx),
        },
    )
}

/// Sending side, owned by the scope that started the loop.
#[derive(Debug)]
pub struct StopHandle {
    token: CancellationToken,
    exited: Option<oneshot::Receiver<()>>,
}

impl StopHandle {
    /// Signals the listener and blocks until it has been dropped.
    ///
    /// Returns immediately if the listener is already gone. Must not be
    /// called from async code.
    pub fn stop(mut self) {
        self.token.cancel();
        self.wait_for_exit();
    }

    fn wait_for_exit(&mut self) {
        if let Some(exited) = self.exited.take() {
            // Err means the listener dropped without acknowledging; it is gone either way.
            let _ = exited.blocking_recv();
        }
    }
}

impl Drop for StopHandle {
    /// Cancels, then waits for the exit acknowledgment unless dropped inside
    /// async code, where blocking is not allowed.
    fn drop(&mut self) {
        self.token.cancel();
        if Handle::try_current().is_err() {
            self.wait_for_exit();
        }
    }
}

/// Receiving side, owned by the loop.
#[derive(Debug)]
pub struct StopListener {
    token: CancellationToken,
    exited: Option<oneshot::Sender<()>>,
}

impl StopListener {
    /// Resolves once the handle has stopped or been dropped.
    pub async fn stopped(&self) {
        self.token.cancelled().await;
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for StopListener {
    fn drop(&mut self) {
        if let Some(exited) = self.exited.take() {
            let _ = exited.send(());
        }
    }
}
