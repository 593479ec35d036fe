//! API error body and the mapping from domain errors to responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::TimetableError;

/// JSON error body returned by every failing endpoint.
pub struct ApiErrorType {
    pub status: StatusCode,
    pub message: String,
    pub detail: Option<String>,
}

impl From<(StatusCode, &str, Option<String>)> for ApiErrorType {
    fn from((status, message, detail): (StatusCode, &str, Option<String>)) -> Self {
        Self {
            status,
            message: message.to_string(),
            detail,
        }
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.message,
            "detail": self.detail,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Maps a `TimetableError` to the HTTP response reported to the
/// operator. Conflict responses carry the blocking bookings verbatim.
pub fn error_response(error: TimetableError) -> Response {
    let status = match &error {
        TimetableError::DuplicateCode { .. }
        | TimetableError::ReferentialBlock { .. }
        | TimetableError::LastAdminProtection { .. }
        | TimetableError::SelfDeletionBlocked { .. } => StatusCode::CONFLICT,
        TimetableError::InstructorConflict { .. } | TimetableError::ClassroomConflict { .. } => {
            StatusCode::CONFLICT
        }
        TimetableError::Forbidden { .. } => StatusCode::FORBIDDEN,
        TimetableError::NotFound { .. } => StatusCode::NOT_FOUND,
        TimetableError::InvalidTimeRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TimetableError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if error.is_conflict() {
        let body = json!({
            "error": error.to_string(),
            "conflicts": error.conflicts(),
        });
        return (status, Json(body)).into_response();
    }

    let body = json!({ "error": error.to_string() });
    (status, Json(body)).into_response()
}
