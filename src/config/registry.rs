//! Typed registry of capture devices, mixers and their outputs.
//!
//! The registry is read from a TOML file. Each output is a tagged variant, so
//! a file output hands the uploader a [`DeliveryConfig`] directly:
//!
//! ```toml
//! [[devices]]
//! name = "rtl0"
//!
//! [[devices.channels]]
//! label = "tower"
//!
//! [[devices.channels.outputs]]
//! type = "file"
//! base_directory = "/var/lib/recordings/tower"
//! endpoint_url = "https://archive.example.net/upload"
//! path_suffix_filter = ".mp3"
//! recurse_dated_subdirectories = true
//!
//! [[mixers]]
//! name = "all"
//! enabled = false
//!
//! [[mixers.channel.outputs]]
//! type = "icecast"
//! ```
//!
//! Output kinds other than `file` are accepted and ignored by the uploader.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::types::DeliveryConfig;

/// Errors that can occur while loading the registry.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid TOML or does not match the schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One output attached to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputSink {
    /// Recordings written to disk, optionally delivered to an endpoint.
    File(DeliveryConfig),

    /// Any other sink kind (streaming, network audio). Not delivered.
    #[serde(other)]
    Other,
}

impl OutputSink {
    /// Returns the delivery configuration for file outputs.
    pub fn delivery(&self) -> Option<&DeliveryConfig> {
        match self {
            OutputSink::File(config) => Some(config),
            OutputSink::Other => None,
        }
    }
}

/// A demodulated channel and its outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub outputs: Vec<OutputSink>,
}

/// A capture device and its channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub channels: Vec<Channel>,
}

/// A mixer combining several channels into one output channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Mixer {
    #[serde(default)]
    pub name: String,

    /// Disabled mixers produce no recordings and are skipped by the scan.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub channel: Channel,
}

fn default_enabled() -> bool {
    true
}

/// All configured devices and mixers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub devices: Vec<Device>,

    #[serde(default)]
    pub mixers: Vec<Mixer>,
}

impl Registry {
    /// Loads the registry from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses the registry from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Returns every channel that can produce recordings: all device channels
    /// and the channels of enabled mixers.
    pub fn active_channels(&self) -> impl Iterator<Item = &Channel> {
        let device_channels = self.devices.iter().flat_map(|d| d.channels.iter());
        let mixer_channels = self
            .mixers
            .iter()
            .filter(|m| m.enabled)
            .map(|m| &m.channel);
        device_channels.chain(mixer_channels)
    }

    /// Returns the delivery configuration of every file output on an active
    /// channel.
    pub fn file_outputs(&self) -> impl Iterator<Item = &DeliveryConfig> {
        self.active_channels()
            .flat_map(|c| c.outputs.iter())
            .filter_map(OutputSink::delivery)
    }

    /// Returns the file outputs whose base directory should be rescanned at
    /// startup.
    pub fn startup_scan_targets(&self) -> impl Iterator<Item = &DeliveryConfig> {
        self.file_outputs().filter(|c| c.wants_startup_scan())
    }
}
