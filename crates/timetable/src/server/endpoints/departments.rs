use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use std::sync::Arc;
use tracing::info;

use crate::auth::Session;
use crate::models::NewDepartment;
use crate::server::types::{error_response, ApiErrorType};
use crate::server::util::is_valid_code;
use crate::types::AppState;

/// GET /departments
pub async fn get_departments(State(s): State<Arc<AppState>>) -> Response {
    match s.store.list_departments() {
        Ok(departments) => (StatusCode::OK, Json(departments)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /departments (admin)
pub async fn post_department(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(dept): Json<NewDepartment>,
) -> Response {
    info!("POST /departments ({})", dept.code);

    if let Err(e) = session.require_admin() {
        return error_response(e);
    }
    if !is_valid_code(&dept.code) {
        return ApiErrorType::from((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid department code",
            Some(dept.code),
        ))
        .into_response();
    }

    match s.store.create_department(&dept) {
        Ok(department) => (StatusCode::CREATED, Json(department)).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /departments/:id (admin)
pub async fn delete_department(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(department_id): Path<i64>,
) -> Response {
    info!("DELETE /departments/{department_id}");

    if let Err(e) = session.require_admin() {
        return error_response(e);
    }
    match s.store.delete_department(department_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}
