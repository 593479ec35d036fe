use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::types::AppState;

/// GET /health
///
/// Unauthenticated liveness probe; also confirms the store answers.
pub async fn get_health(State(s): State<Arc<AppState>>) -> Response {
    match s.store.admin_count() {
        Ok(admins) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "admin_accounts": admins,
                "active_sessions": s.sessions.len(),
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "error": e.to_string() })),
        )
            .into_response(),
    }
}
