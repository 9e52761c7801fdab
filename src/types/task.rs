//! A single scheduled delivery attempt.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use super::config::DeliveryConfig;

/// One pending delivery of one file.
///
/// The path is the deduplication key: while a task for a path is pending, no
/// second task for the same path can be queued. A failed attempt produces a
/// new task for the same path via [`UploadTask::retry_at`], carrying the
/// attempt count and original enqueue time forward.
#[derive(Debug, Clone)]
pub struct UploadTask {
    /// File to deliver.
    pub path: PathBuf,

    /// Configuration snapshot taken when the task was first enqueued.
    pub config: DeliveryConfig,

    /// Earliest instant at which the task may be attempted.
    pub next_attempt: Instant,

    /// Number of failed attempts so far.
    pub attempt: u32,

    /// When the producer (or the startup scan) first enqueued this file.
    pub enqueued_at: DateTime<Utc>,
}

impl UploadTask {
    /// Creates a task that is eligible immediately.
    pub fn new(path: impl Into<PathBuf>, config: DeliveryConfig) -> Self {
        UploadTask {
            path: path.into(),
            config,
            next_attempt: Instant::now(),
            attempt: 0,
            enqueued_at: Utc::now(),
        }
    }

    /// Returns the continuation of this job after a failed attempt.
    pub fn retry_at(mut self, next_attempt: Instant) -> Self {
        self.next_attempt = next_attempt;
        self.attempt = self.attempt.saturating_add(1);
        self
    }
}
