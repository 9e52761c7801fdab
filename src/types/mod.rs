//! Core domain types for file delivery.

pub mod config;
pub mod task;

pub use config::{DEFAULT_RETRY_INTERVAL_SECS, DeliveryConfig};
pub use task::UploadTask;
