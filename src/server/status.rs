//! Read-only view of the pending delivery queue.

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::AppState;
use crate::types::UploadTask;

/// One pending upload as reported by `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpload {
    pub path: String,
    pub endpoint_url: String,

    /// Number of failed attempts so far.
    pub attempt: u32,
    pub enqueued_at: DateTime<Utc>,

    /// Seconds until the task becomes eligible; zero if already due.
    pub eligible_in_secs: u64,
}

impl PendingUpload {
    fn from_task(task: &UploadTask, now: Instant) -> Self {
        PendingUpload {
            path: task.path.display().to_string(),
            endpoint_url: task.config.endpoint_url.clone(),
            attempt: task.attempt,
            enqueued_at: task.enqueued_at,
            eligible_in_secs: task.next_attempt.saturating_duration_since(now).as_secs(),
        }
    }
}

/// Body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub pending: usize,

    /// Pending tasks in the order they will be attempted.
    pub tasks: Vec<PendingUpload>,
}

/// Reports the pending queue as JSON.
///
/// The in-flight task, if any, is not listed: it leaves the queue when its
/// attempt starts.
pub async fn status_handler(State(app_state): State<AppState>) -> Json<StatusReport> {
    let now = Instant::now();
    let tasks: Vec<PendingUpload> = app_state
        .store()
        .snapshot()
        .iter()
        .map(|task| PendingUpload::from_task(task, now))
        .collect();

    Json(StatusReport {
        pending: tasks.len(),
        tasks,
    })
}
