//! Delivery failure causes.
//!
//! Every variant is recoverable: the worker answers all of them by
//! rescheduling the task. The distinction between transport-level failures and
//! HTTP rejections only selects which retry interval applies.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The kind of delivery failure, categorized for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request never produced a response (file unreadable, connection
    /// refused, DNS failure, timeout).
    Transport,

    /// The endpoint responded with a status outside `200..300`.
    Rejected {
        /// The HTTP status code.
        status: u16,
    },
}

/// Why one delivery attempt failed.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The file could not be read at attempt time.
    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The HTTP request failed before a response was received.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned HTTP {status}")]
    Rejected { status: u16 },
}

impl TransportError {
    /// Returns the retry category for this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            TransportError::Rejected { status } => FailureKind::Rejected { status: *status },
            TransportError::ReadFile { .. } | TransportError::Request(_) => FailureKind::Transport,
        }
    }

    /// Returns the HTTP status code, if the endpoint responded.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TransportError::Rejected { status } => Some(*status),
            TransportError::Request(e) => e.status().map(|s| s.as_u16()),
            TransportError::ReadFile { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_carries_status() {
        let err = TransportError::Rejected { status: 503 };
        assert_eq!(err.kind(), FailureKind::Rejected { status: 503 });
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.to_string(), "endpoint returned HTTP 503");
    }

    #[test]
    fn unreadable_file_is_transport_failure() {
        let err = TransportError::ReadFile {
            path: PathBuf::from("/rec/a.mp3"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.kind(), FailureKind::Transport);
        assert_eq!(err.status_code(), None);
        assert!(err.to_string().starts_with("failed to read /rec/a.mp3"));
    }
}
