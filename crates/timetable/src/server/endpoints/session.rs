use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::server::types::{error_response, ApiErrorType};
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub credential: String,
}

/// POST /login
///
/// Verifies the credential and returns a bearer token.
pub async fn post_login(
    State(s): State<Arc<AppState>>,
    Json(login): Json<LoginRequest>,
) -> Response {
    info!("POST /login ({})", login.username);

    let account = match s.store.find_account_by_username(&login.username) {
        Ok(Some(account)) => account,
        Ok(None) => {
            warn!("login failed for unknown username {}", login.username);
            return ApiErrorType::from((
                StatusCode::UNAUTHORIZED,
                "Invalid username or credential",
                None,
            ))
            .into_response();
        }
        Err(e) => return error_response(e),
    };

    match s.sessions.login(&account, &login.credential) {
        Some(token) => (
            StatusCode::OK,
            Json(json!({
                "token": token,
                "account_id": account.account_id,
                "role": account.role,
                "display_name": account.display_name,
            })),
        )
            .into_response(),
        None => {
            warn!("login failed for {}", login.username);
            ApiErrorType::from((
                StatusCode::UNAUTHORIZED,
                "Invalid username or credential",
                None,
            ))
            .into_response()
        }
    }
}

/// POST /logout
///
/// Discards the presented token. Always succeeds.
pub async fn post_logout(State(s): State<Arc<AppState>>, req: Request) -> Response {
    if let Some(token) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        s.sessions.logout(token);
    }
    StatusCode::NO_CONTENT.into_response()
}
