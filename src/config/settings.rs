//! Process-wide tunables for the uploader.
//!
//! These apply to every output and are read from the environment:
//!
//! - `UPLOAD_SPOOL_REQUEST_TIMEOUT_SECS`: whole-request timeout (default 300)
//! - `UPLOAD_SPOOL_CONNECT_TIMEOUT_SECS`: connection timeout (default 30)

use std::time::Duration;

/// Default whole-request timeout (5 minutes, long enough for large recordings).
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Settings shared by all deliveries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploaderSettings {
    /// Upper bound on a single upload, from connect to response.
    pub request_timeout: Duration,

    /// Upper bound on establishing the connection.
    pub connect_timeout: Duration,

    /// `User-Agent` header sent with every upload.
    pub user_agent: String,
}

impl Default for UploaderSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl UploaderSettings {
    /// Creates settings with default values.
    pub fn new() -> Self {
        UploaderSettings {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Creates settings from environment variables, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secs = |key: &str, default: u64| {
            lookup(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        UploaderSettings {
            request_timeout: Duration::from_secs(secs(
                "UPLOAD_SPOOL_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            connect_timeout: Duration::from_secs(secs(
                "UPLOAD_SPOOL_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
            ..Self::new()
        }
    }
}
