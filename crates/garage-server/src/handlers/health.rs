//! Health check handler

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::error;

use crate::AppState;

/// GET /api/health - Database liveness check
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.db.ping() {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "ok": true }))),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "ok": false, "error": "server_error" })),
            )
        }
    }
}
