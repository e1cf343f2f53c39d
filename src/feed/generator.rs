//! Background item generator.
//!
//! On a fixed interval, picks one entry from the profile catalog uniformly at
//! random, stamps it with the current time and appends it to the work queue.

use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::queue::WorkQueue;
use crate::domain::profile::CatalogEntry;
use crate::domain::WorkItem;

/// Produces work items on a timer until shutdown
pub struct ItemGenerator {
    queue: WorkQueue,
    catalog: Vec<CatalogEntry>,
    interval: Duration,
    rng: StdRng,
}

impl ItemGenerator {
    /// Create a generator seeded from OS entropy
    pub fn new(queue: WorkQueue, catalog: Vec<CatalogEntry>, interval: Duration) -> Self {
        Self {
            queue,
            catalog,
            interval,
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a fixed seed (reproducible picks)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Synthesize one item without queueing it.
    ///
    /// Returns `None` only when the catalog is empty.
    pub fn generate(&mut self) -> Option<WorkItem> {
        let entry = self.catalog.choose(&mut self.rng)?;
        Some(WorkItem::at(
            entry.title.clone(),
            entry.description.clone(),
            Utc::now(),
        ))
    }

    /// Generate one item and append it to the queue
    pub fn tick(&mut self) -> Option<WorkItem> {
        let item = self.generate()?;
        self.queue.append(item.clone());
        info!(
            title = %item.title,
            timestamp = %item.arrival_timestamp.format("%Y-%m-%d %H:%M:%S"),
            queued = self.queue.len(),
            "New item added"
        );
        Some(item)
    }

    /// Tick every interval until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// The first item is produced immediately.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        if self.catalog.is_empty() {
            warn!("Item catalog is empty, generator not started");
            return;
        }

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval_secs = self.interval.as_secs_f64(), "Item generator started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Item generator stopped");
    }

    /// Run on a background task
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
