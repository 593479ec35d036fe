use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use std::sync::Arc;
use tracing::info;

use crate::auth::Session;
use crate::export;
use crate::server::types::error_response;
use crate::types::AppState;

fn csv_response(filename: &str, body: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// GET /export/schedule (admin)
///
/// Day-by-day CSV of the full timetable.
pub async fn get_schedule_export(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Response {
    info!("GET /export/schedule");

    if let Err(e) = session.require_admin() {
        return error_response(e);
    }
    match s.store.schedule_rows() {
        Ok(rows) => csv_response("timetable.csv", export::daily_report(&rows)),
        Err(e) => error_response(e),
    }
}

/// GET /export/academic_years (admin)
///
/// CSV grouped by academic year (year n covers semesters 2n-1 and 2n).
pub async fn get_academic_year_export(
    State(s): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Response {
    info!("GET /export/academic_years");

    if let Err(e) = session.require_admin() {
        return error_response(e);
    }
    match s.store.schedule_rows() {
        Ok(rows) => csv_response("timetable_by_year.csv", export::academic_year_report(&rows)),
        Err(e) => error_response(e),
    }
}
