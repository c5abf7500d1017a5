//! Thread-safe work queue
//!
//! Populated once before any worker starts, then drained concurrently.
//! `pop` never blocks; an empty queue simply reports `None` and the worker
//! exits its loop.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::WorkItem;

/// FIFO of work items shared across workers. Each item is consumed exactly
/// once.
pub struct WorkQueue {
    items: Mutex<VecDeque<WorkItem>>,
}

impl WorkQueue {
    /// Builds the queue from the fully-resolved item list. This is the only
    /// push, and it happens before consumption begins.
    pub fn new(items: Vec<WorkItem>) -> Self {
        Self {
            items: Mutex::new(items.into()),
        }
    }

    /// Pops the next item, or `None` when the queue is exhausted.
    pub fn pop(&self) -> Option<WorkItem> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
    }

    pub fn len(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
