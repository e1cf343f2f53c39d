//! The four mutating pipeline stages.
//!
//! Each stage reads the state accumulated so far and returns a `StateUpdate`.
//! Stages never fail: every recoverable problem becomes a log line and, where
//! needed, a fallback value.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::action::ActionExecutor;
use super::decision::DecisionEngine;
use crate::adapters::AnalysisOracle;
use crate::domain::{Decision, DomainProfile, PipelineState, StateUpdate, NO_DATA_SENTINEL};
use crate::feed::{FeedSource, FetchOutcome};

/// Position of a stage in the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Fetch,
    Analyze,
    Decide,
    Act,
    Report,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Fetch => "fetch",
            StageKind::Analyze => "analyze",
            StageKind::Decide => "decide",
            StageKind::Act => "act",
            StageKind::Report => "report",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of the cycle
#[async_trait]
pub trait Stage: Send + Sync {
    fn kind(&self) -> StageKind;

    /// Produce this stage's partial output from the state so far
    async fn run(&self, state: &PipelineState) -> StateUpdate;
}

/// FETCH: pull at most one item from the feed
pub struct FetchStage {
    feed: Arc<dyn FeedSource>,
    role: String,
    noun: String,
}

impl FetchStage {
    pub fn new(feed: Arc<dyn FeedSource>, profile: &DomainProfile) -> Self {
        Self {
            feed,
            role: profile.roles.monitor.clone(),
            noun: profile.noun.clone(),
        }
    }
}

#[async_trait]
impl Stage for FetchStage {
    fn kind(&self) -> StageKind {
        StageKind::Fetch
    }

    async fn run(&self, _state: &PipelineState) -> StateUpdate {
        match self.feed.fetch().await {
            FetchOutcome::Item(item) => StateUpdate::log(format!(
                "{}: New {} found: {}",
                self.role, self.noun, item.title
            ))
            .with_item(item),
            FetchOutcome::Empty => {
                StateUpdate::log(format!("{}: No {} available in feed", self.role, self.noun))
            }
            FetchOutcome::Unavailable(cause) => StateUpdate::log(format!(
                "{}: Feed unavailable at {} ({}), continuing without a {}",
                self.role,
                self.feed.describe(),
                cause,
                self.noun
            )),
        }
    }
}

/// ANALYZE: ask the oracle, or substitute the sentinel
pub struct AnalyzeStage {
    oracle: Arc<dyn AnalysisOracle>,
    role: String,
    noun: String,
}

impl AnalyzeStage {
    pub fn new(oracle: Arc<dyn AnalysisOracle>, profile: &DomainProfile) -> Self {
        Self {
            oracle,
            role: profile.roles.analyzer.clone(),
            noun: profile.noun.clone(),
        }
    }
}

#[async_trait]
impl Stage for AnalyzeStage {
    fn kind(&self) -> StageKind {
        StageKind::Analyze
    }

    async fn run(&self, state: &PipelineState) -> StateUpdate {
        let Some(item) = state.item.as_ref() else {
            return StateUpdate::log(format!("{}: No {} data received.", self.role, self.noun))
                .with_analysis(NO_DATA_SENTINEL);
        };

        match self.oracle.analyze(&item.title, &item.description).await {
            Ok(report) => {
                debug!(oracle = self.oracle.name(), chars = report.len(), "Analysis received");
                StateUpdate::log(format!(
                    "{} ({}): Analysis report for '{}': {}",
                    self.role,
                    self.oracle.name(),
                    item.title,
                    report
                ))
                .with_analysis(report)
            }
            Err(e) => {
                warn!(oracle = self.oracle.name(), error = %e, "Oracle unavailable");
                StateUpdate::log(format!(
                    "{}: Oracle unavailable for '{}' ({}), using placeholder analysis.",
                    self.role, item.title, e
                ))
                .with_analysis(NO_DATA_SENTINEL)
            }
        }
    }
}

/// DECIDE: keyword scoring; always sets a decision
pub struct DecideStage {
    engine: DecisionEngine,
    role: String,
    noun: String,
}

impl DecideStage {
    pub fn new(engine: DecisionEngine, profile: &DomainProfile) -> Self {
        Self {
            engine,
            role: profile.roles.strategist.clone(),
            noun: profile.noun.clone(),
        }
    }
}

#[async_trait]
impl Stage for DecideStage {
    fn kind(&self) -> StageKind {
        StageKind::Decide
    }

    async fn run(&self, state: &PipelineState) -> StateUpdate {
        let analysis = state.analysis.as_deref().unwrap_or(NO_DATA_SENTINEL);
        let verdict = self.engine.evaluate(analysis);

        let subject = match state.item.as_ref() {
            Some(item) => format!("'{}'", item.title),
            None => format!("no {}", self.noun),
        };
        let assessment = match verdict.decision {
            Decision::For => "Analysis is generally positive for",
            Decision::Against => "Analysis indicates potential risks for",
            Decision::Abstain => "Mixed or neutral analysis for",
        };

        StateUpdate::log(format!(
            "{}: {} {} (positive {}, negative {}), deciding '{}'.",
            self.role,
            assessment,
            subject,
            verdict.positive_score,
            verdict.negative_score,
            verdict.decision
        ))
        .with_decision(verdict.decision)
    }
}

/// ACT: commit the decision through the executor
pub struct ActStage {
    executor: ActionExecutor,
}

impl ActStage {
    pub fn new(executor: ActionExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Stage for ActStage {
    fn kind(&self) -> StageKind {
        StageKind::Act
    }

    async fn run(&self, state: &PipelineState) -> StateUpdate {
        self.executor.execute(state.decision, state.item.as_ref())
    }
}
