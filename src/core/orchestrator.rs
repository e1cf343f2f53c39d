//! Main orchestrator for the decision pipeline.
//!
//! Runs FETCH → ANALYZE → DECIDE → ACT → REPORT strictly in order, merging
//! each stage's output into a fresh `PipelineState`, then sleeps and repeats
//! until shutdown.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, instrument};
use uuid::Uuid;

use super::action::ActionExecutor;
use super::decision::DecisionEngine;
use super::stages::{ActStage, AnalyzeStage, DecideStage, FetchStage, Stage, StageKind};
use crate::adapters::AnalysisOracle;
use crate::domain::{Decision, DomainProfile, PipelineState, ProfileKind};
use crate::feed::FeedSource;

/// What REPORT surfaces for one finished cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub item_title: Option<String>,
    pub analysis: Option<String>,
    pub decision: Option<Decision>,
    pub action_taken: Option<bool>,
    pub log: Vec<String>,
}

impl CycleReport {
    fn from_state(state: PipelineState, duration_ms: u64) -> Self {
        let log = state.log().to_vec();
        Self {
            cycle_id: state.cycle_id,
            started_at: state.started_at,
            duration_ms,
            item_title: state.item.map(|i| i.title),
            analysis: state.analysis,
            decision: state.decision,
            action_taken: state.action_taken,
            log,
        }
    }
}

/// Main pipeline orchestrator
pub struct Orchestrator {
    profile: ProfileKind,
    /// Fixed order: fetch, analyze, decide, act
    stages: Vec<Box<dyn Stage>>,
    cycle_interval: Duration,
}

impl Orchestrator {
    /// Assemble the standard stage sequence for `profile`
    pub fn new(
        profile: &DomainProfile,
        feed: Arc<dyn FeedSource>,
        oracle: Arc<dyn AnalysisOracle>,
        cycle_interval: Duration,
    ) -> Self {
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(FetchStage::new(feed, profile)),
            Box::new(AnalyzeStage::new(oracle, profile)),
            Box::new(DecideStage::new(
                DecisionEngine::new(profile.keywords.clone()),
                profile,
            )),
            Box::new(ActStage::new(ActionExecutor::new(profile))),
        ];

        Self {
            profile: profile.kind,
            stages,
            cycle_interval,
        }
    }

    pub fn cycle_interval(&self) -> Duration {
        self.cycle_interval
    }

    /// Run one complete cycle
    pub async fn run_cycle(&self) -> CycleReport {
        self.run_cycle_observed(|_, _| {}).await
    }

    /// Run one cycle, calling `observe` after every merge (and once for REPORT)
    #[instrument(skip_all, fields(profile = %self.profile))]
    pub async fn run_cycle_observed<F>(&self, mut observe: F) -> CycleReport
    where
        F: FnMut(StageKind, &PipelineState),
    {
        let started = Instant::now();
        let mut state = PipelineState::new();

        for stage in &self.stages {
            let update = stage.run(&state).await;
            state.merge(update);
            observe(stage.kind(), &state);
        }

        observe(StageKind::Report, &state);
        self.report(state, started.elapsed().as_millis() as u64)
    }

    /// REPORT: emit the audit trail and hand back the finished cycle
    fn report(&self, state: PipelineState, duration_ms: u64) -> CycleReport {
        let cycle_id = state.cycle_id;
        for line in state.log() {
            info!(%cycle_id, "{}", line);
        }

        let report = CycleReport::from_state(state, duration_ms);
        info!(
            %cycle_id,
            decision = report.decision.map(|d| d.as_str()).unwrap_or("none"),
            action_taken = report.action_taken.unwrap_or(false),
            duration_ms,
            "Cycle completed"
        );
        report
    }

    /// Cycle forever until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// A cycle in flight always completes; shutdown interrupts only the sleep
    /// between cycles. Returns the number of completed cycles.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut cycles = 0u64;
        info!(
            profile = %self.profile,
            interval_secs = self.cycle_interval.as_secs_f64(),
            "Pipeline started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.run_cycle().await;
            cycles += 1;

            tokio::select! {
                _ = tokio::time::sleep(self.cycle_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(cycles, "Pipeline stopped");
        cycles
    }
}
