use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use std::sync::Arc;
use tracing::info;

use crate::auth::Session;
use crate::models::{CourseUpdate, NewCourse};
use crate::server::types::{error_response, ApiErrorType};
use crate::server::util::is_valid_code;
use crate::types::AppState;

/// GET /courses
pub async fn get_courses(State(s): State<Arc<AppState>>) -> Response {
    match s.store.list_courses() {
        Ok(courses) => (StatusCode::OK, Json(courses)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /courses (admin)
pub async fn post_course(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(course): Json<NewCourse>,
) -> Response {
    info!("POST /courses ({})", course.code);

    if let Err(e) = session.require_admin() {
        return error_response(e);
    }
    if !is_valid_code(&course.code) {
        return ApiErrorType::from((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid course code",
            Some(course.code),
        ))
        .into_response();
    }
    if !(1..=8).contains(&course.semester) {
        return ApiErrorType::from((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Semester must be between 1 and 8",
            Some(course.semester.to_string()),
        ))
        .into_response();
    }

    match s.store.create_course(&course) {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /courses/:id (admin)
pub async fn put_course(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(course_id): Path<i64>,
    Json(update): Json<CourseUpdate>,
) -> Response {
    info!("PUT /courses/{course_id}");

    if let Err(e) = session.require_admin() {
        return error_response(e);
    }
    if !(1..=8).contains(&update.semester) {
        return ApiErrorType::from((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Semester must be between 1 and 8",
            Some(update.semester.to_string()),
        ))
        .into_response();
    }

    match s.store.update_course(course_id, &update) {
        Ok(course) => (StatusCode::OK, Json(course)).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /courses/:id (admin)
pub async fn delete_course(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(course_id): Path<i64>,
) -> Response {
    info!("DELETE /courses/{course_id}");

    if let Err(e) = session.require_admin() {
        return error_response(e);
    }
    match s.store.delete_course(course_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}
