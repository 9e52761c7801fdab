//! Deadline-ordered task queue with per-path deduplication.
//!
//! Tasks are ordered by their next eligible attempt, then by sequence number
//! (FIFO among tasks sharing a deadline). The queue itself is not
//! synchronized; [`DeliveryStore`](super::DeliveryStore) wraps it in a lock.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::path::{Path, PathBuf};

use tokio::time::Instant;

use crate::types::UploadTask;

/// An entry in the heap.
#[derive(Debug)]
struct QueuedTask {
    task: UploadTask,

    /// Sequence number for FIFO ordering among equal deadlines.
    sequence: u64,
}

// BinaryHeap is a max-heap, so the ordering is reversed: the earliest
// deadline (and, among equals, the lowest sequence) compares greatest.
impl PartialEq for QueuedTask {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedTask {}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .task
            .next_attempt
            .cmp(&self.task.next_attempt)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// What the head of the queue allows at a given instant.
#[derive(Debug)]
pub enum Head {
    /// The earliest task was due and has been removed from the queue.
    Ready(UploadTask),

    /// The earliest task is not due until the given instant.
    NotBefore(Instant),

    /// Nothing is queued.
    Empty,
}

/// A queue of upload tasks keyed by path.
#[derive(Debug, Default)]
pub struct TaskQueue {
    heap: BinaryHeap<QueuedTask>,

    /// Counter for generating sequence numbers.
    next_sequence: u64,

    /// Paths currently in the heap.
    queued_paths: HashSet<PathBuf>,
}

impl TaskQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        TaskQueue::default()
    }

    /// Returns the number of pending tasks.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns true if a task for `path` is pending.
    pub fn contains(&self, path: &Path) -> bool {
        self.queued_paths.contains(path)
    }

    /// Pushes a task.
    ///
    /// Returns `false` without queuing anything if a task for the same path
    /// is already pending.
    pub fn push(&mut self, task: UploadTask) -> bool {
        if !self.queued_paths.insert(task.path.clone()) {
            return false;
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(QueuedTask { task, sequence });
        true
    }

    /// Returns the deadline of the earliest task.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|q| q.task.next_attempt)
    }

    /// Removes the earliest task if it is due at `now`.
    ///
    /// Removing a task releases its path, so the same path can be queued
    /// again while the task is being attempted.
    pub fn pop_ready(&mut self, now: Instant) -> Head {
        let Some(deadline) = self.next_deadline() else {
            return Head::Empty;
        };
        if deadline > now {
            return Head::NotBefore(deadline);
        }
        match self.heap.pop() {
            Some(QueuedTask { task, .. }) => {
                self.queued_paths.remove(&task.path);
                Head::Ready(task)
            }
            None => Head::Empty,
        }
    }

    /// Returns clones of all pending tasks in the order they will be attempted.
    pub fn snapshot(&self) -> Vec<UploadTask> {
        let mut entries: Vec<&QueuedTask> = self.heap.iter().collect();
        // Reverse of the heap ordering: earliest first.
        entries.sort_by(|a, b| b.cmp(a));
        entries.into_iter().map(|q| q.task.clone()).collect()
    }
}
