//! Offline oracle.
//!
//! Deterministic stand-in used when no model API key is configured: the
//! "analysis" is the item text itself, so keyword scoring still sees the
//! vocabulary of the item.

use async_trait::async_trait;

use super::{AnalysisOracle, OracleError};

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineOracle;

impl OfflineOracle {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AnalysisOracle for OfflineOracle {
    fn name(&self) -> &str {
        "offline"
    }

    async fn analyze(&self, title: &str, description: &str) -> Result<String, OracleError> {
        Ok(format!("{}\n\n{}", title, description))
    }
}
