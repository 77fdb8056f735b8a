//! Scoped ownership of the host's freeze flag.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use tracing::debug;

use crate::host::HostUi;

/// Hands out [`FreezeGuard`]s one owner at a time.
///
/// A caller on another thread blocks in [`FreezeGate::acquire`] until the
/// current owner's guard is dropped, so the flag is never set by two owners at
/// once. The owning thread may acquire again while it holds the flag; the
/// nested guard leaves the flag alone.
pub struct FreezeGate {
    host: Arc<dyn HostUi>,
    lock: Mutex<()>,
    owner: Mutex<Option<ThreadId>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking previous owner still cleared the flag in its Drop.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FreezeGate {
    pub fn new(host: Arc<dyn HostUi>) -> Self {
        Self {
            host,
            lock: Mutex::new(()),
            owner: Mutex::new(None),
        }
    }

    /// Sets the freeze flag until the returned guard drops.
    pub fn acquire(&self) -> FreezeGuard<'_> {
        let current = thread::current().id();
        // Only the owning thread ever writes its own id here.
        if *lock(&self.owner) == Some(current) {
            debug!(event = "tui.freeze.nested");
            return FreezeGuard {
                gate: self,
                held: None,
            };
        }

        let held = lock(&self.lock);
        *lock(&self.owner) = Some(current);
        self.host.set_freeze(true);
        debug!(event = "tui.freeze.acquired");
        FreezeGuard {
            gate: self,
            held: Some(held),
        }
    }
}

/// Clears the freeze flag on drop, on every exit path.
#[must_use = "the freeze flag is cleared as soon as the guard drops"]
pub struct FreezeGuard<'a> {
    gate: &'a FreezeGate,
    /// `None` for a nested guard taken by the current owner.
    held: Option<MutexGuard<'a, ()>>,
}

impl Drop for FreezeGuard<'_> {
    fn drop(&mut self) {
        let Some(held) = self.held.take() else {
            return;
        };
        *lock(&self.gate.owner) = None;
        self.gate.host.set_freeze(false);
        debug!(event = "tui.freeze.released");
        drop(held);
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::time::Duration;

    use super::*;
    use crate::testing::RecordingHost;

    #[test]
    fn test_guard_sets_and_clears_flag() {
        let host = Arc::new(RecordingHost::default());
        let gate = FreezeGate::new(host.clone());

        {
            let _guard = gate.acquire();
            assert_eq!(host.freeze_calls(), vec![true]);
        }
        assert_eq!(host.freeze_calls(), vec![true, false]);
    }

    #[test]
    fn test_flag_cleared_when_owner_panics() {
        let host = Arc::new(RecordingHost::default());
        let gate = FreezeGate::new(host.clone());

        let result = catch_unwind(AssertUnwindSafe(|| {
            let _guard = gate.acquire();
            panic!("operation blew up");
        }));

        assert!(result.is_err());
        assert_eq!(host.freeze_calls(), vec![true, false]);

        // The poisoned lock is still usable.
        drop(gate.acquire());
        assert_eq!(host.freeze_calls(), vec![true, false, true, false]);
    }

    #[test]
    fn test_nested_acquire_by_owner_does_not_block() {
        let host = Arc::new(RecordingHost::default());
        let gate = Arc::new(FreezeGate::new(host.clone()));
        let (done_tx, done_rx) = std::sync::mpsc::channel();

        let worker = {
            let gate = Arc::clone(&gate);
            std::thread::spawn(move || {
                let _outer = gate.acquire();
                {
                    let _inner = gate.acquire();
                }
                done_tx.send(()).unwrap();
            })
        };

        done_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("nested acquire should not block");
        worker.join().unwrap();
        assert_eq!(host.freeze_calls(), vec![true, false]);

        // The gate is free again for another thread.
        let other = std::thread::spawn(move || drop(gate.acquire()));
        other.join().unwrap();
        assert_eq!(host.freeze_calls(), vec![true, false, true, false]);
    }

    #[test]
    fn test_concurrent_owners_are_serialized() {
        let host = Arc::new(RecordingHost::default());
        let gate = Arc::new(FreezeGate::new(host.clone()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || {
                    let _guard = gate.acquire();
                    std::thread::sleep(Duration::from_millis(10));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let calls = host.freeze_calls();
        assert_eq!(calls.len(), 8);
        for pair in calls.chunks(2) {
            assert_eq!(pair, [true, false]);
        }
    }
}
