//! Per-output delivery configuration.
//!
//! A `DeliveryConfig` belongs to one file output. It is cloned into every
//! task at enqueue time, so editing an output's configuration never changes
//! tasks that are already queued.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default interval between delivery attempts for the same file (60 seconds).
pub const DEFAULT_RETRY_INTERVAL_SECS: u64 = 60;

/// How and where files produced by one output are delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Endpoint receiving the multipart POST. Empty disables delivery.
    #[serde(default)]
    pub endpoint_url: String,

    /// Delete the local file after a successful upload instead of renaming it.
    #[serde(default)]
    pub delete_on_success: bool,

    /// Delay before retrying a failed attempt.
    #[serde(
        default = "default_retry_interval",
        rename = "retry_interval_secs",
        with = "duration_secs"
    )]
    pub retry_interval: Duration,

    /// Delay before retrying when the endpoint answered with a non-2xx status.
    ///
    /// When unset, rejections are retried after `retry_interval` like any
    /// other failure.
    #[serde(
        default,
        rename = "rejection_retry_interval_secs",
        with = "option_duration_secs"
    )]
    pub rejection_retry_interval: Option<Duration>,

    /// Whether the startup scan descends into subdirectories (the recorder's
    /// dated directory layout).
    #[serde(default)]
    pub recurse_dated_subdirectories: bool,

    /// Only files whose full path ends with this suffix are picked up by the
    /// startup scan. Empty matches everything.
    #[serde(default)]
    pub path_suffix_filter: String,

    /// Directory the output writes into.
    #[serde(default)]
    pub base_directory: PathBuf,

    /// Rescan `base_directory` for undelivered files at startup.
    #[serde(default = "default_scan_on_startup")]
    pub scan_on_startup: bool,
}

impl DeliveryConfig {
    /// Creates a configuration for `endpoint_url` with default settings.
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        DeliveryConfig {
            endpoint_url: endpoint_url.into(),
            delete_on_success: false,
            retry_interval: default_retry_interval(),
            rejection_retry_interval: None,
            recurse_dated_subdirectories: false,
            path_suffix_filter: String::new(),
            base_directory: PathBuf::new(),
            scan_on_startup: default_scan_on_startup(),
        }
    }

    /// Returns true if this output has an endpoint to deliver to.
    pub fn is_enabled(&self) -> bool {
        !self.endpoint_url.is_empty()
    }

    /// Returns true if the startup scan should run for this output.
    pub fn wants_startup_scan(&self) -> bool {
        self.is_enabled() && self.scan_on_startup
    }

    /// Sets the directory the output writes into.
    pub fn with_base_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_directory = dir.into();
        self
    }

    /// Sets the retry interval.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Sets whether delivered files are deleted instead of renamed.
    pub fn with_delete_on_success(mut self, delete: bool) -> Self {
        self.delete_on_success = delete;
        self
    }
}

fn default_retry_interval() -> Duration {
    Duration::from_secs(DEFAULT_RETRY_INTERVAL_SECS)
}

fn default_scan_on_startup() -> bool {
    true
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

mod option_duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}
