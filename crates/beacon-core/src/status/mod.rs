//! Status registry: the set of toast and waiting entries currently shown.
//!
//! The TUI only talks to [`StatusRegistry`]. [`StatusStack`] is the default
//! in-memory implementation.

mod stack;

pub use stack::{StatusStack, WaitingGuard};

/// Source of truth for what the status line should display.
///
/// Implementations must be safe to call from any thread concurrently.
/// The display string is empty if and only if no entry is active.
pub trait StatusRegistry: Send + Sync {
    /// Pushes a self-expiring notification.
    fn add_toast(&self, message: &str);

    /// Runs `f` on the calling thread while a waiting entry for `message` is
    /// active. The entry is removed when `f` returns or unwinds.
    fn run_under_waiting_status<'a>(&self, message: &str, f: Box<dyn FnOnce() + 'a>);

    fn has_status(&self) -> bool;

    /// Current display string, empty when nothing is active.
    fn status_string(&self) -> String;
}
