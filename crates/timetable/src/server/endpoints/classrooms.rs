use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use std::sync::Arc;
use tracing::info;

use crate::auth::Session;
use crate::models::{ClassroomUpdate, NewClassroom};
use crate::server::types::{error_response, ApiErrorType};
use crate::server::util::is_valid_code;
use crate::types::AppState;

/// GET /classrooms
pub async fn get_classrooms(State(s): State<Arc<AppState>>) -> Response {
    match s.store.list_classrooms() {
        Ok(classrooms) => (StatusCode::OK, Json(classrooms)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /classrooms (admin)
pub async fn post_classroom(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(room): Json<NewClassroom>,
) -> Response {
    info!("POST /classrooms ({})", room.code);

    if let Err(e) = session.require_admin() {
        return error_response(e);
    }
    if !is_valid_code(&room.code) {
        return ApiErrorType::from((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid classroom code",
            Some(room.code),
        ))
        .into_response();
    }

    match s.store.create_classroom(&room) {
        Ok(classroom) => (StatusCode::CREATED, Json(classroom)).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /classrooms/:id (admin)
pub async fn put_classroom(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(classroom_id): Path<i64>,
    Json(update): Json<ClassroomUpdate>,
) -> Response {
    info!("PUT /classrooms/{classroom_id}");

    if let Err(e) = session.require_admin() {
        return error_response(e);
    }
    match s.store.update_classroom(classroom_id, &update) {
        Ok(classroom) => (StatusCode::OK, Json(classroom)).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /classrooms/:id (admin)
pub async fn delete_classroom(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(classroom_id): Path<i64>,
) -> Response {
    info!("DELETE /classrooms/{classroom_id}");

    if let Err(e) = session.require_admin() {
        return error_response(e);
    }
    match s.store.delete_classroom(classroom_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}
