//! In-memory FIFO shared between the generator and the feed endpoint.
//!
//! Every operation takes the lock for the in-memory mutation only; no guard is
//! ever held across an `.await`, so the queue is safe to use from async tasks.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::WorkItem;

/// Unbounded FIFO of pending work items.
///
/// Cloning yields another handle to the same queue. There is no capacity
/// bound: a consumer slower than the producer lets the queue grow.
#[derive(Debug, Clone, Default)]
pub struct WorkQueue {
    inner: Arc<Mutex<VecDeque<WorkItem>>>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the tail
    pub fn append(&self, item: WorkItem) {
        self.lock().push_back(item);
    }

    /// Remove and return the head, or `None` when empty.
    ///
    /// Pop and return happen under one lock acquisition, so an item is handed
    /// to at most one caller.
    pub fn pop_front(&self) -> Option<WorkItem> {
        self.lock().pop_front()
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave a VecDeque half-mutated,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<WorkItem>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pop_returns_none() {
        let queue = WorkQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.pop_front(), None);
    }

    #[test]
    fn test_fifo_order() {
        let queue = WorkQueue::new();
        queue.append(WorkItem::new("A", "first"));
        queue.append(WorkItem::new("B", "second"));
        queue.append(WorkItem::new("C", "third"));
        assert_eq!(queue.len(), 3);

        let titles: Vec<String> = std::iter::from_fn(|| queue.pop_front())
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, ["A", "B", "C"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let producer = WorkQueue::new();
        let consumer = producer.clone();

        producer.append(WorkItem::new("shared", ""));
        assert_eq!(consumer.pop_front().map(|i| i.title), Some("shared".to_string()));
        assert!(producer.is_empty());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let queue = WorkQueue::new();
        let item = WorkItem::new("dup", "dup");
        queue.append(item.clone());
        queue.append(item.clone());
        assert_eq!(queue.len(), 2);
    }
}
