//! Delivery of one file to its endpoint.
//!
//! A [`Transport`] performs exactly one attempt per call. The outcome is
//! binary: the upload either completed with a 2xx response or it did not.
//! Failure causes are reported so the worker can log them and pick a retry
//! interval, but they never change what happens next beyond that.
//!
//! The trait-based design allows the worker to be driven by a scripted
//! transport in tests.

mod error;
mod http;

use std::future::Future;

use crate::types::UploadTask;

pub use error::{FailureKind, TransportError};
pub use http::{FILE_FIELD, HttpTransport};

/// Performs delivery attempts.
pub trait Transport {
    /// Attempts to deliver `task` once.
    ///
    /// Returns `Ok(())` only if the endpoint responded with a status in
    /// `200..300`.
    fn deliver(
        &self,
        task: &UploadTask,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
