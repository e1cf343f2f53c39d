//! Domain types for the tally pipeline.
//!
//! This module contains the core data structures:
//! - WorkItem: One unit of input pulled from the feed
//! - PipelineState: The record threaded through one cycle
//! - DomainProfile: Vocabulary that parameterizes the generic pipeline

pub mod item;
pub mod profile;
pub mod state;

// Re-export commonly used types
pub use item::WorkItem;
pub use profile::{DomainProfile, KeywordSets, ProfileKind};
pub use state::{Decision, PipelineState, StateUpdate, NO_DATA_SENTINEL};
