// handlers/health.rs - GET /health handler

use axum::{extract::State, response::IntoResponse};
use serde_json::json;

use crate::middleware::ApiResponse;
use crate::state::AppState;

/// Liveness check. Does not contact the hosted backend.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let auth = if state.auth.is_initialized() { "configured" } else { "unconfigured" };

    ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "project": state.config.backend.project_id,
        "auth": auth,
    }))
}
