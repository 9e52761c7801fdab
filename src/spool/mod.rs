//! On-disk state of recordings awaiting delivery.
//!
//! The filesystem is the durable record of what still needs uploading. There
//! is no separate journal: a recording is pending for as long as its name
//! lacks the uploaded marker.
//!
//! ```text
//! clip.mp3           - pending (written by the recorder, not yet delivered)
//! clip_uploaded.mp3  - delivered and kept
//! (absent)           - delivered and deleted
//! ```
//!
//! # Crash Safety
//!
//! - The rename (or delete) happens only after the endpoint acknowledged the upload
//! - The containing directory is fsynced afterwards
//! - On startup, [`scan_directory`] re-enqueues everything still pending
//!
//! A crash between the acknowledgement and the rename means the file is
//! uploaded again after restart: delivery is at-least-once.

pub mod finalize;
pub mod fsync;
pub mod marker;
pub mod scan;

pub use finalize::{FinalizeError, Finalized, finalize_delivered};
pub use marker::{UPLOADED_MARKER, is_uploaded_name, uploaded_name, uploaded_path};
pub use scan::{is_pending_file, scan_directory};
