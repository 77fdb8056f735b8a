use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: AtomicU64,
}

impl TaskSeq {
    pub fn next_id(&self) -> TaskId {
        TaskId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle passed to work running on a worker context.
///
/// Cancelled when the dispatcher shuts down. Long operations should check it
/// between steps.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancel: CancellationToken,
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId, cancel: CancellationToken) -> Self {
        Self { id, cancel }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the task has been cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_ids_are_sequential() {
        let seq = TaskSeq::default();
        assert_eq!(seq.next_id(), TaskId(0));
        assert_eq!(seq.next_id(), TaskId(1));
        assert_eq!(seq.next_id().to_string(), "task-2");
    }

    #[test]
    fn test_handle_observes_parent_cancellation() {
        let root = CancellationToken::new();
        let handle = TaskHandle::new(TaskId(7), root.child_token());
        assert!(!handle.is_cancelled());
        root.cancel();
        assert!(handle.is_cancelled());
    }
}
