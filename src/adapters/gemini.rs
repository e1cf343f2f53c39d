//! Gemini adapter for item analysis.
//!
//! Calls the `generateContent` REST endpoint with a profile-specific prompt
//! and returns the text of the first candidate.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use super::{AnalysisOracle, OracleError};
use crate::domain::DomainProfile;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// The key travels in this header so it never appears in a request URL
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Configuration for the Gemini oracle
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
    pub timeout: Duration,
}

/// Gemini-backed analysis oracle
pub struct GeminiOracle {
    config: GeminiConfig,
    /// Prompt template from the active profile
    prompt_profile: DomainProfile,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Response from generateContent (only the fields we read)
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate
    fn first_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl GeminiOracle {
    pub fn new(config: GeminiConfig, profile: &DomainProfile) -> Self {
        Self {
            config,
            prompt_profile: profile.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Build API URL (carries no credentials)
    fn api_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        let request = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .client
            .post(self.api_url())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed.first_text().ok_or(OracleError::EmptyResponse)
    }
}

#[async_trait]
impl AnalysisOracle for GeminiOracle {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn analyze(&self, title: &str, description: &str) -> Result<String, OracleError> {
        let prompt = self.prompt_profile.render_prompt(title, description);
        timeout(self.config.timeout, self.generate(&prompt))
            .await
            .map_err(|_| OracleError::Timeout(self.config.timeout))?
    }
}
