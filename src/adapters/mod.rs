//! Adapter interfaces for the analysis oracle.
//!
//! The oracle turns an item's title and description into free-form analysis
//! text. It is an external collaborator: the pipeline only relies on the
//! `AnalysisOracle` contract and falls back to a sentinel when it fails.

pub mod gemini;
pub mod offline;

use async_trait::async_trait;
use thiserror::Error;

// Re-export the adapters
pub use gemini::{GeminiConfig, GeminiOracle};
pub use offline::OfflineOracle;

/// Oracle failures; all of them are recovered by the analysis stage
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("oracle returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("oracle returned no analysis text")]
    EmptyResponse,

    #[error("oracle timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Trait for analysis oracles
#[async_trait]
pub trait AnalysisOracle: Send + Sync {
    /// Human-readable oracle name
    fn name(&self) -> &str;

    /// Produce analysis text for one item
    async fn analyze(&self, title: &str, description: &str) -> Result<String, OracleError>;
}
