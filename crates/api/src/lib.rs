//! HTTP surface for node metrics.

pub mod stats;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use nodestat_core::NodeError;
use nodestat_system::NodeMonitor;
use std::sync::Arc;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<NodeMonitor>,
}

impl AppState {
    pub fn new(monitor: NodeMonitor) -> Self {
        Self {
            monitor: Arc::new(monitor),
        }
    }
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/system/stats", get(stats::get_node_stats))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Failure returned by handlers.
///
/// The underlying reason is logged; the response body is fixed.
#[derive(Debug)]
pub struct ApiError(NodeError);

impl From<NodeError> for ApiError {
    fn from(err: NodeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "failed to collect node metrics");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "The metrics could not be obtained for the node",
            })),
        )
            .into_response()
    }
}
