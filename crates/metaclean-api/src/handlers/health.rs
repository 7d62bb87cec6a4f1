use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use metaclean_core::{DeepHealthResponse, HealthResponse};

use crate::state::AppState;

/// Liveness probe. No auth, no tool invocation.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Readiness probe: runs the tool's version command.
pub async fn deep_health(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<DeepHealthResponse>) {
    let tool = state.sanitizer.tool_name().to_string();
    match state.sanitizer.tool_version().await {
        Ok(version) => (
            StatusCode::OK,
            Json(DeepHealthResponse {
                status: "ok".to_string(),
                tool,
                tool_version: Some(version),
            }),
        ),
        Err(e) => {
            tracing::warn!(tool = %tool, error = %e, "Metadata tool unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(DeepHealthResponse {
                    status: "unavailable".to_string(),
                    tool,
                    tool_version: None,
                }),
            )
        }
    }
}
