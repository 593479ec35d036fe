use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use std::sync::Arc;
use tracing::info;

use crate::auth::{hash_credential, Session};
use crate::models::NewAccount;
use crate::server::types::{error_response, ApiErrorType};
use crate::server::util::is_valid_code;
use crate::types::AppState;

/// GET /accounts (admin)
pub async fn get_accounts(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Response {
    if let Err(e) = session.require_admin() {
        return error_response(e);
    }
    match s.store.list_accounts() {
        Ok(accounts) => (StatusCode::OK, Json(accounts)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /accounts (admin)
pub async fn post_account(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(account): Json<NewAccount>,
) -> Response {
    info!("POST /accounts ({})", account.username);

    if let Err(e) = session.require_admin() {
        return error_response(e);
    }
    if !is_valid_code(&account.username) {
        return ApiErrorType::from((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid username",
            Some(account.username),
        ))
        .into_response();
    }

    let credential_hash = hash_credential(&account.credential);
    match s.store.create_account(&account, &credential_hash) {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /accounts/:id (admin)
///
/// Rejected when the target is the caller's own account or the last
/// remaining admin. Any live sessions of the deleted account are
/// revoked.
pub async fn delete_account(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(account_id): Path<i64>,
) -> Response {
    info!("DELETE /accounts/{account_id}");

    if let Err(e) = session.require_admin() {
        return error_response(e);
    }
    match s.store.delete_account(account_id, session.account_id) {
        Ok(()) => {
            s.sessions.revoke_account(account_id);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(e),
    }
}
