//! The decoupled work feed.
//!
//! A background generator appends items to a shared queue; an HTTP endpoint
//! pops one item per request; the pipeline polls that endpoint through a
//! client that folds every failure into "no item".
//!
//! ```text
//! ItemGenerator → WorkQueue → FeedEndpoint ─ HTTP ─→ FeedClient → pipeline
//! ```

pub mod client;
pub mod generator;
pub mod queue;
pub mod server;

use async_trait::async_trait;

use crate::domain::WorkItem;

// Re-export key types
pub use client::{FeedClient, FeedError};
pub use generator::ItemGenerator;
pub use queue::WorkQueue;
pub use server::{build_router, serve_on, FeedState};

/// Result of one fetch attempt, already normalized for the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The feed handed over an item
    Item(WorkItem),

    /// The feed answered but had nothing queued
    Empty,

    /// The feed could not be reached or answered with garbage
    Unavailable(String),
}

impl FetchOutcome {
    /// Collapse to the optional item the pipeline cares about
    pub fn into_item(self) -> Option<WorkItem> {
        match self {
            FetchOutcome::Item(item) => Some(item),
            FetchOutcome::Empty | FetchOutcome::Unavailable(_) => None,
        }
    }
}

/// Anything the fetch stage can pull work from.
///
/// Implementations must not fail: transport problems are reported as
/// `FetchOutcome::Unavailable`.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Human-readable source description for logs
    fn describe(&self) -> String;

    /// Pull at most one item
    async fn fetch(&self) -> FetchOutcome;
}

/// Reads straight from an in-process queue, bypassing HTTP
#[async_trait]
impl FeedSource for WorkQueue {
    fn describe(&self) -> String {
        "in-process queue".to_string()
    }

    async fn fetch(&self) -> FetchOutcome {
        match self.pop_front() {
            Some(item) => FetchOutcome::Item(item),
            None => FetchOutcome::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_item() {
        let item = WorkItem::new("A", "B");
        assert_eq!(FetchOutcome::Item(item.clone()).into_item(), Some(item));
        assert_eq!(FetchOutcome::Empty.into_item(), None);
        assert_eq!(FetchOutcome::Unavailable("down".into()).into_item(), None);
    }

    #[tokio::test]
    async fn test_queue_as_feed_source() {
        let queue = WorkQueue::new();
        assert_eq!(queue.fetch().await, FetchOutcome::Empty);

        queue.append(WorkItem::new("A", "B"));
        assert!(matches!(queue.fetch().await, FetchOutcome::Item(i) if i.title == "A"));
    }
}
