//! HTTP feed endpoint.
//!
//! `GET <route>` pops the head of the work queue and returns it as JSON, or
//! answers 404 when nothing is queued. `GET /health` reports queue depth.

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tracing::{debug, info};

use super::queue::WorkQueue;
use crate::domain::DomainProfile;

/// Shared state passed to the route handlers
#[derive(Clone)]
pub struct FeedState {
    pub queue: WorkQueue,
    plural: Arc<str>,
}

impl FeedState {
    pub fn new(queue: WorkQueue, profile: &DomainProfile) -> Self {
        Self {
            queue,
            plural: Arc::from(profile.plural.as_str()),
        }
    }
}

/// Build the router serving `route` (e.g. "/proposal") plus `/health`.
pub fn build_router(state: FeedState, route: &str) -> Router {
    Router::new()
        .route(route, get(next_item))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve the feed on a pre-bound listener until `shutdown` resolves.
pub async fn serve_on<F>(
    listener: TcpListener,
    state: FeedState,
    route: &str,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state, route);

    if let Ok(addr) = listener.local_addr() {
        info!("Feed endpoint listening on http://{addr}{route}");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Feed endpoint stopped");
    Ok(())
}

/// GET <route>: hand out the oldest queued item exactly once
async fn next_item(State(feed): State<FeedState>) -> Response {
    // Single pop: the item is removed and returned in one critical section.
    match feed.queue.pop_front() {
        Some(item) => {
            debug!(title = %item.title, "Served item");
            (StatusCode::OK, Json(item)).into_response()
        }
        None => {
            let body = serde_json::json!({
                "message": format!("No {} available", feed.plural),
            });
            (StatusCode::NOT_FOUND, Json(body)).into_response()
        }
    }
}

/// GET /health: liveness plus queue depth
async fn health(State(feed): State<FeedState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "queued": feed.queue.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_state_uses_profile_plural() {
        let state = FeedState::new(WorkQueue::new(), &DomainProfile::network());
        assert_eq!(&*state.plural, "advisories");
    }
}
