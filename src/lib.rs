//! Upload Spool - crash-tolerant background delivery of recorded files.
//!
//! Producers hand finished recordings to an [`Uploader`]; a single background
//! worker POSTs each one to its configured HTTP endpoint, retrying failures
//! indefinitely, and marks delivered files on disk by renaming or deleting
//! them. After a restart, [`Uploader::scan_pending`] re-enqueues whatever was
//! still undelivered.

pub mod config;
pub mod server;
pub mod spool;
pub mod store;
pub mod transport;
pub mod types;
pub mod worker;

mod uploader;

#[cfg(test)]
pub mod test_utils;

pub use uploader::{UploadHandle, Uploader};
