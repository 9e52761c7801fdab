//! Shared test utilities: a local upload endpoint and a scripted transport.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::transport::{Transport, TransportError};
use crate::types::UploadTask;

/// One multipart field received by a [`TestEndpoint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedPart {
    pub field: String,
    pub file_name: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Clone)]
struct EndpointState {
    status: Arc<AtomicU16>,
    received: Arc<Mutex<Vec<Vec<ReceivedPart>>>>,
}

/// An HTTP server on an ephemeral local port accepting multipart uploads.
///
/// Every request's parts are recorded; the response status is configurable.
#[derive(Clone)]
pub struct TestEndpoint {
    pub url: String,
    state: EndpointState,
}

impl TestEndpoint {
    /// Starts an endpoint answering `/upload` with `status`.
    pub async fn spawn(status: StatusCode) -> Self {
        let state = EndpointState {
            status: Arc::new(AtomicU16::new(status.as_u16())),
            received: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/upload", post(receive_upload))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestEndpoint {
            url: format!("http://{addr}/upload"),
            state,
        }
    }

    /// Changes the status returned for subsequent requests.
    pub fn set_status(&self, status: StatusCode) {
        self.state.status.store(status.as_u16(), Ordering::SeqCst);
    }

    /// Returns the parts of every request received so far.
    pub fn requests(&self) -> Vec<Vec<ReceivedPart>> {
        self.state.received.lock().clone()
    }
}

async fn receive_upload(
    State(state): State<EndpointState>,
    mut multipart: Multipart,
) -> StatusCode {
    let mut parts = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let body = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        parts.push(ReceivedPart {
            field: name,
            file_name,
            body,
        });
    }
    state.received.lock().push(parts);
    StatusCode::from_u16(state.status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Returns a URL nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/upload")
}

/// A transport that replays scripted results and records every attempt.
///
/// When the script runs out, attempts succeed.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Result<(), u16>>>>,
    attempts: Arc<Mutex<Vec<(PathBuf, Instant)>>>,
    delay: Option<Duration>,
    started: Arc<Notify>,
}

impl ScriptedTransport {
    /// Creates a transport returning the given results in order.
    ///
    /// `Err(status)` is reported as an HTTP rejection with that status.
    pub fn new(script: impl IntoIterator<Item = Result<(), u16>>) -> Self {
        ScriptedTransport {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            ..Default::default()
        }
    }

    /// Makes every attempt take `delay` before returning.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns the path and start time of every attempt so far.
    pub fn attempts(&self) -> Vec<(PathBuf, Instant)> {
        self.attempts.lock().clone()
    }

    /// Resolves once an attempt has started.
    pub async fn wait_for_attempt(&self) {
        self.started.notified().await;
    }
}

impl Transport for ScriptedTransport {
    async fn deliver(&self, task: &UploadTask) -> Result<(), TransportError> {
        self.attempts
            .lock()
            .push((task.path.clone(), Instant::now()));
        self.started.notify_one();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().pop_front();
        match next {
            Some(Err(status)) => Err(TransportError::Rejected { status }),
            Some(Ok(())) | None => Ok(()),
        }
    }
}
