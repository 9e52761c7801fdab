//! Configuration for the uploader process.
//!
//! - [`settings`]: process-wide tunables read from the environment
//! - [`registry`]: devices, mixers and outputs read from a TOML file

pub mod registry;
pub mod settings;

pub use registry::{Channel, ConfigError, Device, Mixer, OutputSink, Registry};
pub use settings::UploaderSettings;
