//! Command-line interface for tally.
//!
//! Provides commands for running the feed service, running the decision
//! pipeline against a feed, running both in one process, scoring a piece of
//! text, and showing the resolved configuration.

use std::io::{self, Read};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapters::{AnalysisOracle, GeminiOracle, OfflineOracle};
use crate::config::{self, ResolvedConfig};
use crate::core::{CycleReport, DecisionEngine, Orchestrator};
use crate::domain::{DomainProfile, ProfileKind};
use crate::feed::{serve_on, FeedClient, FeedState, ItemGenerator, WorkQueue};

/// tally - Polled decision pipeline over a decoupled work feed
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Domain profile (overrides config file and TALLY_PROFILE)
    #[arg(short, long, global = true, value_enum)]
    pub profile: Option<ProfileArg>,

    /// Config file (skips .tally/config.yaml discovery)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the feed service: item generator plus HTTP endpoint
    Feed {
        /// Address to bind to
        #[arg(short, long)]
        bind: Option<String>,

        /// Seconds between generated items
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Run the decision pipeline against a feed
    Run {
        /// Feed URL to poll
        #[arg(long, env = "TALLY_FEED_URL")]
        feed_url: Option<String>,

        /// Seconds between cycles
        #[arg(short, long)]
        interval: Option<u64>,

        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,

        /// Use the offline oracle even if an API key is set
        #[arg(long)]
        offline: bool,

        /// Print cycle reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run feed service and pipeline in one process
    Up {
        /// Use the offline oracle even if an API key is set
        #[arg(long)]
        offline: bool,
    },

    /// Score analysis text and print the decision
    Decide {
        /// Text to score (reads from stdin if not provided)
        text: Option<String>,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Profile choice for CLI (maps to ProfileKind)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProfileArg {
    /// DAO governance proposals
    Governance,

    /// Network traffic advisories
    Network,
}

impl From<ProfileArg> for ProfileKind {
    fn from(p: ProfileArg) -> Self {
        match p {
            ProfileArg::Governance => ProfileKind::Governance,
            ProfileArg::Network => ProfileKind::Network,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let mut config =
            config::load_config(self.config.as_deref()).context("Failed to load configuration")?;
        if let Some(profile) = self.profile {
            config = config.with_profile(profile.into());
        }

        match self.command {
            Commands::Feed { bind, interval } => run_feed(config, bind, interval).await,
            Commands::Run {
                feed_url,
                interval,
                once,
                offline,
                json,
            } => run_pipeline(config, feed_url, interval, once, offline, json).await,
            Commands::Up { offline } => run_all(config, offline).await,
            Commands::Decide { text } => decide(&config, text),
            Commands::Config => {
                show_config(&config);
                Ok(())
            }
        }
    }
}

/// Watch channel that flips to `true` on Ctrl+C
fn shutdown_signal() -> watch::Receiver<bool> {
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown requested");
        let _ = stop_tx.send(true);
    });
    stop_rx
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Pick the Gemini oracle when configured, the offline oracle otherwise
fn build_oracle(
    config: &ResolvedConfig,
    profile: &DomainProfile,
    offline: bool,
) -> Arc<dyn AnalysisOracle> {
    match config.oracle.gemini() {
        Some(gemini) if !offline => {
            info!(model = %gemini.model, "Using Gemini oracle");
            Arc::new(GeminiOracle::new(gemini, profile))
        }
        Some(_) => {
            info!("Using offline oracle (--offline)");
            Arc::new(OfflineOracle::new())
        }
        None => {
            warn!("{} not set, using offline oracle", config::ENV_API_KEY);
            Arc::new(OfflineOracle::new())
        }
    }
}

/// Start the generator and the HTTP endpoint on an already-bound listener
async fn start_feed(
    listener: TcpListener,
    profile: &DomainProfile,
    generate_interval: Duration,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let queue = WorkQueue::new();
    let generator = ItemGenerator::new(queue.clone(), profile.catalog.clone(), generate_interval)
        .spawn(shutdown.clone());

    serve_on(
        listener,
        FeedState::new(queue, profile),
        &profile.route,
        wait_for_shutdown(shutdown),
    )
    .await?;

    generator.await.context("Item generator task failed")?;
    Ok(())
}

async fn run_feed(config: ResolvedConfig, bind: Option<String>, interval: Option<u64>) -> Result<()> {
    let profile = config.domain_profile();
    let bind = bind.unwrap_or(config.feed.bind);
    let interval = interval
        .map(Duration::from_secs)
        .unwrap_or(config.feed.generate_interval);

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind feed endpoint to {}", bind))?;

    println!("Feed: serving {} on http://{}{}", profile.plural, bind, profile.route);
    println!("    Press Ctrl+C to stop");

    start_feed(listener, &profile, interval, shutdown_signal()).await
}

async fn run_pipeline(
    config: ResolvedConfig,
    feed_url: Option<String>,
    interval: Option<u64>,
    once: bool,
    offline: bool,
    json: bool,
) -> Result<()> {
    let profile = config.domain_profile();
    let url = feed_url.unwrap_or_else(|| config.feed.url.clone());
    let interval = interval
        .map(Duration::from_secs)
        .unwrap_or(config.pipeline.cycle_interval);

    let feed = FeedClient::new(url.clone(), config.pipeline.request_timeout)
        .context("Failed to build feed client")?;
    let oracle = build_oracle(&config, &profile, offline);
    let orchestrator = Orchestrator::new(&profile, Arc::new(feed), oracle, interval);

    if once {
        let report = orchestrator.run_cycle().await;
        print_report(&report, json)?;
        return Ok(());
    }

    println!("Pipeline: polling {} every {:?}", url, interval);
    println!("    Press Ctrl+C to stop");

    let cycles = orchestrator.run(shutdown_signal()).await;
    println!("Stopped after {} cycle(s)", cycles);
    Ok(())
}

async fn run_all(config: ResolvedConfig, offline: bool) -> Result<()> {
    let profile = config.domain_profile();
    let listener = TcpListener::bind(&config.feed.bind)
        .await
        .with_context(|| format!("Failed to bind feed endpoint to {}", config.feed.bind))?;
    let addr: SocketAddr = listener
        .local_addr()
        .context("Failed to read feed endpoint address")?;
    let url = format!("http://{}{}", addr, profile.route);

    let shutdown = shutdown_signal();
    let feed_task = {
        let profile = profile.clone();
        let shutdown = shutdown.clone();
        let interval = config.feed.generate_interval;
        tokio::spawn(async move { start_feed(listener, &profile, interval, shutdown).await })
    };

    let feed = FeedClient::new(url.clone(), config.pipeline.request_timeout)
        .context("Failed to build feed client")?;
    let oracle = build_oracle(&config, &profile, offline);
    let orchestrator =
        Orchestrator::new(&profile, Arc::new(feed), oracle, config.pipeline.cycle_interval);

    println!("Up: feed on {}, pipeline every {:?}", url, config.pipeline.cycle_interval);
    println!("    Press Ctrl+C to stop");

    let cycles = orchestrator.run(shutdown).await;
    feed_task.await.context("Feed task panicked")??;

    println!("Stopped after {} cycle(s)", cycles);
    Ok(())
}

fn decide(config: &ResolvedConfig, text: Option<String>) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read text from stdin")?;
            buffer
        }
    };

    let engine = DecisionEngine::new(config.domain_profile().keywords);
    let verdict = engine.evaluate(&text);

    println!(
        "Decision: {} (positive {}, negative {})",
        verdict.decision, verdict.positive_score, verdict.negative_score
    );
    Ok(())
}

fn print_report(report: &CycleReport, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).context("Failed to serialize cycle report")?
        );
        return Ok(());
    }

    println!("--- Cycle {} ---", report.cycle_id);
    for line in &report.log {
        println!("- {}", line);
    }
    println!(
        "Decision: {}, action taken: {}",
        report.decision.map(|d| d.as_str()).unwrap_or("none"),
        report.action_taken.unwrap_or(false)
    );
    Ok(())
}

fn show_config(config: &ResolvedConfig) {
    println!("Configuration");
    println!(
        "  config file:        {}",
        config
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!("  profile:            {}", config.profile);
    println!("  feed bind:          {}", config.feed.bind);
    println!("  feed url:           {}", config.feed.url);
    println!("  generate interval:  {:?}", config.feed.generate_interval);
    println!("  cycle interval:     {:?}", config.pipeline.cycle_interval);
    println!("  request timeout:    {:?}", config.pipeline.request_timeout);
    println!("  oracle model:       {}", config.oracle.model);
    println!("  oracle temperature: {}", config.oracle.temperature);
    println!(
        "  oracle api key:     {}",
        if config.oracle.gemini().is_some() {
            "set"
        } else {
            "not set (offline)"
        }
    );
}
