//! Oracle Integration Tests
//!
//! Tests for the Gemini oracle against local stand-in servers: credential
//! handling, timeouts, and how the analysis stage recovers from failures.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::RawQuery;
use axum::http::{HeaderMap, StatusCode};
use axum::{Json, Router};
use tokio::net::TcpListener;

use tally::adapters::{AnalysisOracle, GeminiConfig, GeminiOracle, OfflineOracle, OracleError};
use tally::core::{AnalyzeStage, Orchestrator, Stage};
use tally::domain::{DomainProfile, PipelineState, StateUpdate, WorkItem, NO_DATA_SENTINEL};
use tally::feed::WorkQueue;

const API_KEY: &str = "SUPERSECRETKEY123";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn gemini(base_url: &str, timeout: Duration) -> GeminiOracle {
    GeminiOracle::new(
        GeminiConfig {
            api_key: API_KEY.to_string(),
            model: "gemini-test".to_string(),
            temperature: 0.5,
            base_url: base_url.to_string(),
            timeout,
        },
        &DomainProfile::governance(),
    )
}

/// Serve `app` on an ephemeral port; returns the base URL.
async fn spawn_router(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn state_with_item() -> PipelineState {
    let mut state = PipelineState::new();
    state.merge(StateUpdate::default().with_item(WorkItem::new("T", "a clear benefit")));
    state
}

/// Answers only when the key arrives in the header and not in the query string
async fn generate_content(
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> (StatusCode, Json<serde_json::Value>) {
    let header_ok = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        == Some(API_KEY);
    let query_clean = !query.unwrap_or_default().contains(API_KEY);

    if header_ok && query_clean {
        let body = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "A good, valuable step." }] } }]
        });
        (StatusCode::OK, Json(body))
    } else {
        (StatusCode::FORBIDDEN, Json(serde_json::json!({ "error": "bad credentials" })))
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_api_key_sent_as_header() {
    let base = spawn_router(Router::new().fallback(generate_content)).await;
    let oracle = gemini(&base, Duration::from_secs(5));

    let text = oracle.analyze("T", "d").await.unwrap();
    assert_eq!(text, "A good, valuable step.");
}

#[tokio::test]
async fn test_api_key_never_reaches_cycle_log() {
    let queue = WorkQueue::new();
    queue.append(WorkItem::new("T", "a clear benefit"));
    let orchestrator = Orchestrator::new(
        &DomainProfile::governance(),
        Arc::new(queue),
        Arc::new(gemini("http://127.0.0.1:1", Duration::from_secs(5))),
        Duration::from_secs(5),
    );

    let report = orchestrator.run_cycle().await;

    assert_eq!(report.analysis.as_deref(), Some(NO_DATA_SENTINEL));
    assert!(report.log[1].contains("Oracle unavailable"));
    for line in &report.log {
        assert!(!line.contains(API_KEY), "api key in log line: {line}");
    }
    let json = serde_json::to_string(&report).unwrap();
    assert!(!json.contains(API_KEY));
}

// ---------------------------------------------------------------------------
// Timeouts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_slow_oracle_times_out() {
    let app = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        StatusCode::OK
    });
    let base = spawn_router(app).await;
    let oracle = gemini(&base, Duration::from_millis(200));

    let result = oracle.analyze("T", "d").await;
    assert!(matches!(result, Err(OracleError::Timeout(_))));
}

#[tokio::test]
async fn test_timed_out_oracle_falls_back_to_sentinel() {
    let app = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        StatusCode::OK
    });
    let base = spawn_router(app).await;
    let stage = AnalyzeStage::new(
        Arc::new(gemini(&base, Duration::from_millis(200))),
        &DomainProfile::governance(),
    );

    let update = stage.run(&state_with_item()).await;

    assert_eq!(update.analysis.as_deref(), Some(NO_DATA_SENTINEL));
    assert!(update.log[0].contains("timed out"));
}

#[tokio::test]
async fn test_offline_oracle_echoes_item() {
    let stage = AnalyzeStage::new(Arc::new(OfflineOracle::new()), &DomainProfile::governance());
    let update = stage.run(&state_with_item()).await;
    assert_eq!(update.analysis.as_deref(), Some("T\n\na clear benefit"));
}
