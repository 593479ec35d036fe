//! Error types for timetable operations.

use thiserror::Error;

use crate::models::ConflictingEntry;

/// Errors that can occur while managing the timetable.
///
/// Every kind is recoverable: the operation is rejected, the store is
/// left unchanged, and the caller gets enough detail to report the
/// rejection to an operator.
#[derive(Debug, Error)]
pub enum TimetableError {
    /// A create hit the unique constraint on a code or username
    #[error("{entity} code '{code}' is already in use")]
    DuplicateCode { entity: &'static str, code: String },

    /// A delete was blocked by dependent records
    #[error("{entity} '{code}' cannot be deleted: {dependents}")]
    ReferentialBlock {
        entity: &'static str,
        code: String,
        dependents: String,
    },

    /// The course's instructor is already booked in an overlapping slot
    #[error("instructor '{instructor}' is already booked: {}", format_conflicts(.conflicts))]
    InstructorConflict {
        instructor: String,
        conflicts: Vec<ConflictingEntry>,
    },

    /// The classroom is already booked in an overlapping slot
    #[error("classroom '{classroom}' is occupied: {}", format_conflicts(.conflicts))]
    ClassroomConflict {
        classroom: String,
        conflicts: Vec<ConflictingEntry>,
    },

    /// Deleting this account would leave the system without an admin
    #[error("cannot delete the last admin account '{username}'")]
    LastAdminProtection { username: String },

    /// The active admin tried to delete their own account
    #[error("account '{username}' cannot delete itself")]
    SelfDeletionBlocked { username: String },

    /// The session lacks the role required for this operation
    #[error("operation requires the {required} role")]
    Forbidden { required: &'static str },

    /// A referenced record does not exist
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The proposed slot does not end after it starts
    #[error("end time {end} is not after start time {start}")]
    InvalidTimeRange { start: String, end: String },

    /// Unexpected storage failure; nothing was committed
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

fn format_conflicts(conflicts: &[ConflictingEntry]) -> String {
    conflicts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl TimetableError {
    /// Returns true for the two double-booking rejections.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            TimetableError::InstructorConflict { .. } | TimetableError::ClassroomConflict { .. }
        )
    }

    /// The bookings that blocked an insertion, when this is a conflict.
    pub fn conflicts(&self) -> &[ConflictingEntry] {
        match self {
            TimetableError::InstructorConflict { conflicts, .. }
            | TimetableError::ClassroomConflict { conflicts, .. } => conflicts,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, TimetableError>;
