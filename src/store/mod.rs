//! Scheduling store for pending uploads.
//!
//! Producers push file paths in; the single delivery worker takes tasks out in
//! deadline order. Each path is represented by at most one pending task.
//!
//! # Module Structure
//!
//! - [`queue`]: Unsynchronized deadline-ordered queue with path deduplication
//! - [`delivery_store`]: Locked, notifying wrapper used across threads

mod delivery_store;
mod queue;

pub use delivery_store::DeliveryStore;
pub use queue::{Head, TaskQueue};
