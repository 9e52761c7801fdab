//! Optional HTTP status server.
//!
//! # Endpoints
//!
//! - `GET /health` - Returns 200 if the process is running
//! - `GET /status` - Returns the pending delivery queue as JSON

use std::sync::Arc;

pub mod status;

pub use status::{PendingUpload, StatusReport, status_handler};

use crate::store::DeliveryStore;

/// Shared application state, passed to handlers via axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    store: Arc<DeliveryStore>,
}

impl AppState {
    /// Creates state reading from the given delivery store.
    pub fn new(store: Arc<DeliveryStore>) -> Self {
        AppState { store }
    }

    /// Returns the delivery store.
    pub fn store(&self) -> &DeliveryStore {
        &self.store
    }
}

/// Liveness probe: answers "OK" while the process is serving.
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::get;

    axum::Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .with_state(app_state)
}
