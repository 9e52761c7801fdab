//! Thread-safe scheduling store shared by producers and the worker.

use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::types::{DeliveryConfig, UploadTask};

use super::queue::{Head, TaskQueue};

/// Deadline used when a retry interval is too large to represent.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Returns `now + delay`, capped at [`FAR_FUTURE`] from now.
fn deadline_after(now: Instant, delay: Duration) -> Instant {
    now.checked_add(delay.min(FAR_FUTURE)).unwrap_or(now)
}

/// Pending uploads plus the wakeup used by the worker's deadline wait.
///
/// The lock is only ever held for queue manipulation, never across an await
/// or a network call, so `enqueue` stays cheap for producer threads.
#[derive(Debug, Default)]
pub struct DeliveryStore {
    queue: Mutex<TaskQueue>,

    /// Signalled on every insertion so the waiting worker re-arms its deadline.
    inserted: Notify,
}

impl DeliveryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        DeliveryStore::default()
    }

    /// Queues `path` for delivery using a snapshot of `config`.
    ///
    /// This is a no-op (returning `false`) if the path is empty, delivery is
    /// disabled for the output, or the path already has a pending task.
    pub fn enqueue(&self, path: impl Into<PathBuf>, config: &DeliveryConfig) -> bool {
        let path = path.into();
        if path.as_os_str().is_empty() || !config.is_enabled() {
            trace!(path = %path.display(), "Delivery not configured, ignoring");
            return false;
        }
        self.insert(UploadTask::new(path, config.clone()))
    }

    /// Re-queues a failed task so it becomes eligible after `delay`.
    ///
    /// If a producer re-enqueued the same path while the attempt was in
    /// flight, that fresher task is kept and this one is dropped. Delays
    /// beyond roughly thirty years are capped.
    pub fn requeue_with_delay(&self, task: UploadTask, delay: Duration) -> bool {
        let retry = task.retry_at(deadline_after(Instant::now(), delay));
        let path = retry.path.clone();
        let queued = self.insert(retry);
        if !queued {
            debug!(path = %path.display(), "Path re-enqueued during attempt, dropping retry");
        }
        queued
    }

    fn insert(&self, task: UploadTask) -> bool {
        let queued = self.queue.lock().push(task);
        if queued {
            self.inserted.notify_one();
        }
        queued
    }

    /// Removes the earliest task if it is due at `now`, without waiting.
    pub fn pop_ready(&self, now: Instant) -> Option<UploadTask> {
        match self.queue.lock().pop_ready(now) {
            Head::Ready(task) => Some(task),
            Head::NotBefore(_) | Head::Empty => None,
        }
    }

    /// Waits for the earliest task to become due and removes it.
    ///
    /// Waits indefinitely while the store is empty. While the earliest task
    /// is in the future, waits for its deadline or for an insertion, then
    /// re-evaluates. Cancel-safe: a task is only removed at the point this
    /// future completes.
    pub async fn take_ready(&self) -> UploadTask {
        loop {
            let head = self.queue.lock().pop_ready(Instant::now());
            match head {
                Head::Ready(task) => return task,
                Head::NotBefore(deadline) => {
                    tokio::select! {
                        _ = self.inserted.notified() => {}
                        _ = tokio::time::sleep_until(deadline) => {}
                    }
                }
                Head::Empty => self.inserted.notified().await,
            }
        }
    }

    /// Returns the number of pending tasks.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Returns true if `path` has a pending task.
    pub fn contains(&self, path: &Path) -> bool {
        self.queue.lock().contains(path)
    }

    /// Returns the pending tasks in the order they will be attempted.
    pub fn snapshot(&self) -> Vec<UploadTask> {
        self.queue.lock().snapshot()
    }
}
