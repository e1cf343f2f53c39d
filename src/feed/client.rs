//! HTTP client for the feed endpoint.
//!
//! Every failure mode (unreachable endpoint, timeout, unexpected status,
//! malformed payload) degrades to "no item" for the pipeline. The typed
//! error is kept only to describe the cause in the cycle log.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::{FeedSource, FetchOutcome};
use crate::domain::WorkItem;

/// Why a fetch produced no item
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Wire format of a served item; the timestamp is optional
#[derive(Debug, Deserialize)]
struct FeedPayload {
    title: String,
    description: String,
    #[serde(default)]
    timestamp: Option<String>,
}

impl FeedPayload {
    fn into_item(self) -> WorkItem {
        let arrival = self
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now);
        WorkItem::at(self.title, self.description, arrival)
    }
}

/// Accepts RFC 3339 as well as the plain "YYYY-MM-DD HH:MM:SS" form (read as UTC)
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Polls one feed URL
pub struct FeedClient {
    url: String,
    client: reqwest::Client,
}

impl FeedClient {
    /// Create a client for `url` with a per-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One request: `Ok(None)` means the feed answered 404 (empty queue)
    pub async fn try_fetch(&self) -> Result<Option<WorkItem>, FeedError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let payload: FeedPayload =
            serde_json::from_str(&body).map_err(|e| FeedError::Malformed(e.to_string()))?;

        Ok(Some(payload.into_item()))
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> FetchOutcome {
        match self.try_fetch().await {
            Ok(Some(item)) => {
                debug!(url = %self.url, title = %item.title, "Fetched item");
                FetchOutcome::Item(item)
            }
            Ok(None) => FetchOutcome::Empty,
            Err(e) => {
                warn!(url = %self.url, error = %e, "Feed unavailable");
                FetchOutcome::Unavailable(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_without_timestamp_is_accepted() {
        let payload: FeedPayload =
            serde_json::from_str(r#"{"title":"T","description":"D"}"#).unwrap();
        let item = payload.into_item();
        assert_eq!(item.title, "T");
        assert_eq!(item.description, "D");
    }

    #[test]
    fn test_payload_missing_description_is_rejected() {
        let result = serde_json::from_str::<FeedPayload>(r#"{"title":"T"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2025-01-02T03:04:05Z").unwrap();
        let plain = parse_timestamp("2025-01-02 03:04:05").unwrap();
        assert_eq!(rfc, plain);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_error_messages_name_the_cause() {
        assert_eq!(FeedError::Status(503).to_string(), "unexpected status 503");
        assert!(FeedError::Malformed("missing field `title`".into())
            .to_string()
            .contains("missing field"));
    }
}
