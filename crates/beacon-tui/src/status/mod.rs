//! Transient status line: toasts and waiting statuses.
//!
//! [`AppStatus`] owns when render loops start and stop:
//!
//! - Async loops (`toast`, `with_waiting_status`) paint through the UI queue
//!   every [`POLL_INTERVAL`] and end on their own once the registry is empty.
//!   At most one async loop observes the registry at a time.
//! - The sync loop (`with_waiting_status_sync`) paints directly while the UI
//!   thread is blocked and ends when its [`StopHandle`] fires.

mod orchestrator;
mod render_loop;
mod stop;

pub use orchestrator::AppStatus;
pub use render_loop::{POLL_INTERVAL, status_text};
pub use stop::{StopHandle, StopListener, stop_signal};
