use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::StatusRegistry;
use crate::config::{SpinnerConfig, StatusConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EntryId(u64);

#[derive(Debug)]
enum EntryKind {
    Toast { expires_at: Instant },
    Waiting,
}

#[derive(Debug)]
struct Entry {
    id: EntryId,
    message: String,
    kind: EntryKind,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        match self.kind {
            EntryKind::Toast { expires_at } => now < expires_at,
            EntryKind::Waiting => true,
        }
    }
}

#[derive(Debug, Default)]
struct Entries {
    items: Vec<Entry>,
    next_id: u64,
}

impl Entries {
    fn push(&mut self, message: &str, kind: EntryKind) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.items.push(Entry {
            id,
            message: message.to_string(),
            kind,
        });
        id
    }

    fn prune(&mut self, now: Instant) {
        self.items.retain(|entry| entry.is_live(now));
    }
}

/// In-memory stack of status entries.
///
/// The newest live entry wins the status line. Toasts expire lazily on read.
#[derive(Debug)]
pub struct StatusStack {
    entries: Mutex<Entries>,
    toast_duration: Duration,
    spinner: SpinnerConfig,
    epoch: Instant,
}

impl Default for StatusStack {
    fn default() -> Self {
        Self::new(&StatusConfig::default())
    }
}

impl StatusStack {
    pub fn new(config: &StatusConfig) -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            toast_duration: config.toast_duration(),
            spinner: config.spinner.clone(),
            epoch: Instant::now(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes a waiting entry that stays active until the guard drops.
    pub fn push_waiting(&self, message: &str) -> WaitingGuard<'_> {
        let id = self.lock().push(message, EntryKind::Waiting);
        WaitingGuard { stack: self, id }
    }

    fn remove(&self, id: EntryId) {
        self.lock().items.retain(|entry| entry.id != id);
    }

    fn add_toast_at(&self, message: &str, now: Instant) {
        let expires_at = now + self.toast_duration;
        self.lock().push(message, EntryKind::Toast { expires_at });
    }

    fn status_string_at(&self, now: Instant) -> String {
        let mut entries = self.lock();
        entries.prune(now);
        let Some(top) = entries.items.last() else {
            return String::new();
        };
        match top.kind {
            EntryKind::Waiting => match self.spinner_frame(now) {
                Some(frame) => format!("{} {frame}", top.message),
                None => top.message.clone(),
            },
            EntryKind::Toast { .. } => top.message.clone(),
        }
    }

    fn has_status_at(&self, now: Instant) -> bool {
        let mut entries = self.lock();
        entries.prune(now);
        !entries.items.is_empty()
    }

    fn spinner_frame(&self, now: Instant) -> Option<&str> {
        let frames = &self.spinner.frames;
        if frames.is_empty() {
            return None;
        }
        let ticks = now.saturating_duration_since(self.epoch).as_millis()
            / self.spinner.rate().as_millis();
        frames.get((ticks % frames.len() as u128) as usize).map(String::as_str)
    }
}

impl StatusRegistry for StatusStack {
    fn add_toast(&self, message: &str) {
        self.add_toast_at(message, Instant::now());
    }

    fn run_under_waiting_status<'a>(&self, message: &str, f: Box<dyn FnOnce() + 'a>) {
        let _entry = self.push_waiting(message);
        f();
    }

    fn has_status(&self) -> bool {
        self.has_status_at(Instant::now())
    }

    fn status_string(&self) -> String {
        self.status_string_at(Instant::now())
    }
}

/// Removes its waiting entry on drop, including during unwinding.
#[must_use = "the waiting entry is removed as soon as the guard drops"]
#[derive(Debug)]
pub struct WaitingGuard<'a> {
    stack: &'a StatusStack,
    id: EntryId,
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.stack.remove(self.id);
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    fn quiet_stack() -> StatusStack {
        StatusStack::new(&StatusConfig {
            toast_duration_ms: 2000,
            spinner: SpinnerConfig {
                frames: Vec::new(),
                rate_ms: 50,
            },
        })
    }

    #[test]
    fn test_empty_stack_has_no_status() {
        let stack = quiet_stack();
        assert!(!stack.has_status());
        assert_eq!(stack.status_string(), "");
    }

    #[test]
    fn test_toast_expires_after_duration() {
        let stack = quiet_stack();
        let now = Instant::now();
        stack.add_toast_at("Copied", now);

        assert_eq!(stack.status_string_at(now), "Copied");
        assert!(stack.has_status_at(now + Duration::from_millis(1999)));
        assert_eq!(stack.status_string_at(now + Duration::from_secs(2)), "");
        assert!(!stack.has_status_at(now + Duration::from_secs(2)));
    }

    #[test]
    fn test_newest_entry_wins() {
        let stack = quiet_stack();
        let now = Instant::now();
        let _waiting = stack.push_waiting("Pulling…");
        stack.add_toast_at("Copied", now);

        assert_eq!(stack.status_string_at(now), "Copied");
        assert_eq!(
            stack.status_string_at(now + Duration::from_secs(3)),
            "Pulling…"
        );
    }

    #[test]
    fn test_waiting_entry_removed_after_operation() {
        let stack = quiet_stack();
        let mut seen = String::new();
        stack.run_under_waiting_status("Fetching…", Box::new(|| seen = stack.status_string()));

        assert_eq!(seen, "Fetching…");
        assert!(!stack.has_status());
    }

    #[test]
    fn test_waiting_entry_removed_on_panic() {
        let stack = quiet_stack();
        let result = catch_unwind(AssertUnwindSafe(|| {
            stack.run_under_waiting_status("Rebasing…", Box::new(|| panic!("boom")));
        }));

        assert!(result.is_err());
        assert!(!stack.has_status());
    }

    #[test]
    fn test_nested_waiting_entries_unwind_in_order() {
        let stack = quiet_stack();
        let outer = stack.push_waiting("Outer");
        {
            let _inner = stack.push_waiting("Inner");
            assert_eq!(stack.status_string(), "Inner");
        }
        assert_eq!(stack.status_string(), "Outer");
        drop(outer);
        assert_eq!(stack.status_string(), "");
    }

    #[test]
    fn test_waiting_entry_shows_spinner_frame() {
        let stack = StatusStack::new(&StatusConfig {
            toast_duration_ms: 2000,
            spinner: SpinnerConfig {
                frames: vec!["a".to_string(), "b".to_string()],
                rate_ms: 100,
            },
        });
        let _waiting = stack.push_waiting("Pushing");

        let epoch = stack.epoch;
        assert_eq!(stack.status_string_at(epoch), "Pushing a");
        assert_eq!(
            stack.status_string_at(epoch + Duration::from_millis(150)),
            "Pushing b"
        );
        assert_eq!(
            stack.status_string_at(epoch + Duration::from_millis(200)),
            "Pushing a"
        );
    }
}
