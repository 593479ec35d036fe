use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::auth::Session;
use crate::models::{NewScheduleEntry, Weekday};
use crate::server::types::{error_response, ApiErrorType};
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct ScheduleQueryParams {
    /// Restrict the listing to one weekday.
    pub day: Option<String>,
}

/// GET /schedule
pub async fn get_schedule(
    State(s): State<Arc<AppState>>,
    Query(params): Query<ScheduleQueryParams>,
) -> Response {
    let result = match params.day.as_deref() {
        Some(name) => match Weekday::parse(name) {
            Some(day) => s.store.entries_for_day(day),
            None => {
                return ApiErrorType::from((
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Unknown weekday",
                    Some(name.to_string()),
                ))
                .into_response();
            }
        },
        None => s.store.list_entries(),
    };

    match result {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /schedule (admin)
///
/// Runs the conflict checker; a 409 response carries the bookings that
/// blocked the insertion.
pub async fn post_schedule_entry(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(proposed): Json<NewScheduleEntry>,
) -> Response {
    info!(
        "POST /schedule (course {} in classroom {} on {})",
        proposed.course_id, proposed.classroom_id, proposed.day
    );

    if let Err(e) = session.require_admin() {
        return error_response(e);
    }
    match s.store.validate_and_insert(&proposed) {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /schedule/:id (admin)
pub async fn delete_schedule_entry(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(entry_id): Path<i64>,
) -> Response {
    info!("DELETE /schedule/{entry_id}");

    if let Err(e) = session.require_admin() {
        return error_response(e);
    }
    match s.store.delete_entry(entry_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}
