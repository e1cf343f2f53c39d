//! tally - Polled decision pipeline over a decoupled work feed
//!
//! A background generator manufactures work items (governance proposals or
//! network advisories) into an in-memory queue served over HTTP. A pipeline
//! polls that feed and runs every item through a fixed sequence of stages.
//!
//! # Architecture
//!
//! Each cycle threads one `PipelineState` through the stages:
//! - FETCH: pull at most one item; any failure degrades to "no item"
//! - ANALYZE: ask the analysis oracle, or substitute a sentinel
//! - DECIDE: keyword scoring with an `Abstain` tie-break
//! - ACT: record the simulated action
//! - REPORT: emit the audit trail
//!
//! # Modules
//!
//! - `adapters`: Analysis oracles (Gemini, offline)
//! - `core`: Decision engine, stages, orchestrator
//! - `domain`: Data structures (WorkItem, PipelineState, DomainProfile)
//! - `feed`: Work queue, item generator, HTTP endpoint and client
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Feed service and pipeline in one process
//! tally up
//!
//! # Or separately
//! tally feed --bind 127.0.0.1:5000
//! tally run --feed-url http://127.0.0.1:5000/proposal
//!
//! # Score some text
//! echo "a clear benefit with little risk" | tally decide
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod feed;

// Re-export main types at crate root for convenience
pub use crate::core::{CycleReport, DecisionEngine, Orchestrator};
pub use domain::{Decision, DomainProfile, PipelineState, ProfileKind, WorkItem};
pub use feed::{FeedClient, FeedSource, FetchOutcome, ItemGenerator, WorkQueue};
