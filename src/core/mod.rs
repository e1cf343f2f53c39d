//! Core orchestration logic.
//!
//! This module contains:
//! - DecisionEngine: Keyword scoring and tie-break policy
//! - ActionExecutor: Simulated commit of a decision
//! - Stages: Fetch, analyze, decide and act steps
//! - Orchestrator: Main cycle loop

pub mod action;
pub mod decision;
pub mod orchestrator;
pub mod stages;

// Re-export commonly used types
pub use action::ActionExecutor;
pub use decision::{DecisionEngine, Verdict};
pub use orchestrator::{CycleReport, Orchestrator};
pub use stages::{ActStage, AnalyzeStage, DecideStage, FetchStage, Stage, StageKind};
