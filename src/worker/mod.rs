//! Background delivery of queued files.
//!
//! Exactly one worker runs per [`Uploader`](crate::Uploader). It takes due
//! tasks from the store, uploads them, and either finalizes the file on disk
//! or reschedules the task.

mod worker;


pub use worker::{AttemptOutcome, DeliveryWorker, retry_delay};
