//! The delivery loop.
//!
//! A single worker drains the [`DeliveryStore`] and alternates between two
//! states:
//!
//! - **Waiting**: blocked in [`DeliveryStore::take_ready`] until a task is due.
//!   A shutdown request ends the loop here.
//! - **Delivering**: one attempt through the [`Transport`], followed by the
//!   outcome handling (rename/delete or reschedule). No store lock is held and
//!   shutdown is not observed until the outcome has been applied.
//!
//! # Critical Invariant
//!
//! A file is only renamed or deleted after the endpoint acknowledged it with a
//! 2xx status. Every other result leaves the file in place and schedules a
//! retry, so a recording is never lost to a failed upload.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::spool::{Finalized, finalize_delivered};
use crate::store::DeliveryStore;
use crate::transport::{FailureKind, Transport};
use crate::types::{DeliveryConfig, UploadTask};

/// What one delivery attempt led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The endpoint accepted the file and local housekeeping ran.
    Delivered,

    /// The attempt failed and the task was scheduled again.
    Rescheduled {
        /// Delay before the next attempt.
        retry_in: Duration,
    },

    /// The attempt failed, but a fresher task for the same path was queued
    /// while it was in flight, so no retry was added.
    Superseded,

    /// The file no longer exists; the task was discarded.
    Vanished,
}

/// Returns the retry delay for a failure of the given kind.
///
/// HTTP rejections use `rejection_retry_interval` when it is configured;
/// everything else uses `retry_interval`.
pub fn retry_delay(config: &DeliveryConfig, kind: FailureKind) -> Duration {
    match kind {
        FailureKind::Rejected { .. } => config
            .rejection_retry_interval
            .unwrap_or(config.retry_interval),
        FailureKind::Transport => config.retry_interval,
    }
}

/// The background delivery worker.
#[derive(Debug)]
pub struct DeliveryWorker<T> {
    store: Arc<DeliveryStore>,
    transport: T,
}

impl<T: Transport> DeliveryWorker<T> {
    /// Creates a worker draining `store` through `transport`.
    pub fn new(store: Arc<DeliveryStore>, transport: T) -> Self {
        DeliveryWorker { store, transport }
    }

    /// Runs the loop until `shutdown` is cancelled.
    ///
    /// Cancellation is only observed while waiting for the next task. An
    /// attempt that has started always runs to completion, including its
    /// outcome handling.
    #[instrument(skip_all)]
    pub async fn run(self, shutdown: CancellationToken) {
        info!("Delivery worker started");

        loop {
            let task = tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,
                task = self.store.take_ready() => task,
            };

            self.attempt(task).await;
        }

        info!(pending = self.store.len(), "Delivery worker stopped");
    }

    /// Performs one attempt for `task` and applies its outcome.
    #[instrument(skip_all, fields(path = %task.path.display(), attempt = task.attempt))]
    pub async fn attempt(&self, task: UploadTask) -> AttemptOutcome {
        if !tokio::fs::try_exists(&task.path).await.unwrap_or(true) {
            warn!("File disappeared before delivery, dropping task");
            return AttemptOutcome::Vanished;
        }

        match self.transport.deliver(&task).await {
            Ok(()) => {
                let path = task.path.clone();
                let delete = task.config.delete_on_success;
                // Blocking: rename or unlink, then a directory fsync.
                let finalized =
                    tokio::task::spawn_blocking(move || finalize_delivered(&path, delete)).await;
                match finalized {
                    Ok(Ok(Finalized::Deleted)) => info!("Delivered and deleted"),
                    Ok(Ok(Finalized::Renamed(to))) => {
                        info!(renamed = %to.display(), "Delivered");
                    }
                    Ok(Err(e)) => error!(error = %e, "Delivered, but local cleanup failed"),
                    Err(e) => error!(error = %e, "Delivered, but local cleanup task failed"),
                }
                AttemptOutcome::Delivered
            }
            Err(e) => {
                let retry_in = retry_delay(&task.config, e.kind());
                warn!(
                    error = %e,
                    status = e.status_code(),
                    retry_in = ?retry_in,
                    "Delivery failed, will retry"
                );
                if self.store.requeue_with_delay(task, retry_in) {
                    AttemptOutcome::Rescheduled { retry_in }
                } else {
                    AttemptOutcome::Superseded
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_use_retry_interval() {
        let mut config = DeliveryConfig::new("http://x");
        config.retry_interval = Duration::from_secs(10);
        config.rejection_retry_interval = Some(Duration::from_secs(600));

        assert_eq!(
            retry_delay(&config, FailureKind::Transport),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn rejections_use_dedicated_interval_when_set() {
        let mut config = DeliveryConfig::new("http://x");
        config.retry_interval = Duration::from_secs(10);

        let rejected = FailureKind::Rejected { status: 500 };
        assert_eq!(retry_delay(&config, rejected), Duration::from_secs(10));

        config.rejection_retry_interval = Some(Duration::from_secs(600));
        assert_eq!(retry_delay(&config, rejected), Duration::from_secs(600));
    }
}
