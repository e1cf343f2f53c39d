//! Per-cycle pipeline state and the partial updates stages produce.
//!
//! A `PipelineState` is created empty at the start of every cycle. Each stage
//! reads it, returns a `StateUpdate`, and the orchestrator merges that update
//! before moving on. Merging only ever sets fields and appends log lines.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::WorkItem;

/// Analysis text substituted when there is no item or the oracle failed.
pub const NO_DATA_SENTINEL: &str = "No data available for analysis.";

/// Outcome of the decision stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    For,
    Against,
    Abstain,
}

impl Decision {
    /// Literal name used in logs and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::For => "For",
            Decision::Against => "Against",
            Decision::Abstain => "Abstain",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial output of a single stage.
///
/// Only the fields a stage sets are `Some`; the log lines are appended in order.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub item: Option<WorkItem>,
    pub analysis: Option<String>,
    pub decision: Option<Decision>,
    pub action_taken: Option<bool>,
    pub log: Vec<String>,
}

impl StateUpdate {
    /// An update carrying only a log line
    pub fn log(line: impl Into<String>) -> Self {
        Self::default().with_log(line)
    }

    pub fn with_log(mut self, line: impl Into<String>) -> Self {
        self.log.push(line.into());
        self
    }

    pub fn with_item(mut self, item: WorkItem) -> Self {
        self.item = Some(item);
        self
    }

    pub fn with_analysis(mut self, analysis: impl Into<String>) -> Self {
        self.analysis = Some(analysis.into());
        self
    }

    pub fn with_decision(mut self, decision: Decision) -> Self {
        self.decision = Some(decision);
        self
    }

    pub fn with_action_taken(mut self, taken: bool) -> Self {
        self.action_taken = Some(taken);
        self
    }
}

/// State accumulated across the stages of one cycle
#[derive(Debug, Clone)]
pub struct PipelineState {
    /// Correlates log lines of one cycle
    pub cycle_id: Uuid,

    /// When the cycle started
    pub started_at: DateTime<Utc>,

    /// Present only after a successful fetch
    pub item: Option<WorkItem>,

    /// Oracle output, or the sentinel once the analysis stage has run
    pub analysis: Option<String>,

    /// Always set once the decision stage has run
    pub decision: Option<Decision>,

    /// Set by the action stage
    pub action_taken: Option<bool>,

    /// Append-only audit trail, in stage order
    log: Vec<String>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineState {
    /// Fresh state for a new cycle
    pub fn new() -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            started_at: Utc::now(),
            item: None,
            analysis: None,
            decision: None,
            action_taken: None,
            log: Vec::new(),
        }
    }

    /// Merge a stage's partial output.
    ///
    /// Fields absent from the update are left untouched.
    pub fn merge(&mut self, update: StateUpdate) {
        let StateUpdate {
            item,
            analysis,
            decision,
            action_taken,
            log,
        } = update;

        if item.is_some() {
            self.item = item;
        }
        if analysis.is_some() {
            self.analysis = analysis;
        }
        if decision.is_some() {
            self.decision = decision;
        }
        if action_taken.is_some() {
            self.action_taken = action_taken;
        }
        self.log.extend(log);
    }

    /// The audit trail so far
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// True when the analysis stage substituted the sentinel
    pub fn has_sentinel_analysis(&self) -> bool {
        self.analysis.as_deref() == Some(NO_DATA_SENTINEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = PipelineState::new();
        assert!(state.item.is_none());
        assert!(state.analysis.is_none());
        assert!(state.decision.is_none());
        assert!(state.action_taken.is_none());
        assert!(state.log().is_empty());
    }

    #[test]
    fn test_merge_appends_log_and_keeps_fields() {
        let mut state = PipelineState::new();
        state.merge(
            StateUpdate::log("fetched")
                .with_item(WorkItem::new("T", "D")),
        );
        state.merge(StateUpdate::log("analyzed").with_analysis("text"));
        state.merge(StateUpdate::log("decided").with_decision(Decision::For));

        assert_eq!(state.log(), ["fetched", "analyzed", "decided"]);
        assert_eq!(state.item.as_ref().map(|i| i.title.as_str()), Some("T"));
        assert_eq!(state.analysis.as_deref(), Some("text"));
        assert_eq!(state.decision, Some(Decision::For));
    }

    #[test]
    fn test_merge_never_clears_a_field() {
        let mut state = PipelineState::new();
        state.merge(StateUpdate::default().with_decision(Decision::Against));
        state.merge(StateUpdate::log("nothing else"));
        assert_eq!(state.decision, Some(Decision::Against));
    }

    #[test]
    fn test_sentinel_detection() {
        let mut state = PipelineState::new();
        assert!(!state.has_sentinel_analysis());
        state.merge(StateUpdate::default().with_analysis(NO_DATA_SENTINEL));
        assert!(state.has_sentinel_analysis());
    }

    #[test]
    fn test_decision_literals() {
        assert_eq!(Decision::For.to_string(), "For");
        assert_eq!(Decision::Against.to_string(), "Against");
        assert_eq!(Decision::Abstain.to_string(), "Abstain");
    }
}
