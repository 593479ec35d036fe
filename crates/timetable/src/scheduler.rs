//! The conflict checker: validates a proposed booking against every
//! existing booking on the same day before writing it.
//!
//! The check and the insert run in one SQLite transaction while the
//! connection mutex is held, so two concurrent attempts for the same
//! slot cannot both pass validation.

use chrono::NaiveTime;
use tracing::{info, warn};

use crate::db::{self, queries, TimetableStore};
use crate::error::{Result, TimetableError};
use crate::models::{ConflictingEntry, NewScheduleEntry, ScheduleEntry};

/// Half-open interval overlap: `[a_start, a_end)` intersects
/// `[b_start, b_end)`. Strict on both ends, so slots touching exactly
/// at a boundary do not overlap.
pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && a_end > b_start
}

impl TimetableStore {
    /// Validates a proposed schedule entry and inserts it if no
    /// instructor or classroom is double-booked.
    ///
    /// The instructor scan runs first and short-circuits; the classroom
    /// scan only runs when the instructor is free (or the course has no
    /// instructor). On any conflict nothing is written and the error
    /// carries the blocking bookings.
    pub fn validate_and_insert(&self, proposed: &NewScheduleEntry) -> Result<ScheduleEntry> {
        if proposed.end <= proposed.start {
            return Err(TimetableError::InvalidTimeRange {
                start: proposed.start.format("%H:%M").to_string(),
                end: proposed.end.format("%H:%M").to_string(),
            });
        }

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let course = db::get_course(&tx, proposed.course_id)?;
        db::require_exists(&tx, "classrooms", "classroom_id", proposed.classroom_id, "classroom")?;

        if let Some(instructor_id) = course.instructor_id {
            let bookings =
                queries::day_bookings_for_instructor(&tx, proposed.day, instructor_id)?;
            let conflicts = overlapping(&bookings, proposed);
            if !conflicts.is_empty() {
                let instructor = db::get_account(&tx, instructor_id)?;
                warn!(
                    course = %course.code,
                    day = %proposed.day,
                    "instructor {} already booked ({} conflicting entries)",
                    instructor.display_name,
                    conflicts.len(),
                );
                return Err(TimetableError::InstructorConflict {
                    instructor: instructor.display_name,
                    conflicts,
                });
            }
        }

        let bookings =
            queries::day_bookings_in_classroom(&tx, proposed.day, proposed.classroom_id)?;
        let conflicts = overlapping(&bookings, proposed);
        if !conflicts.is_empty() {
            let classroom = db::entity_code(&tx, "classrooms", "classroom_id", proposed.classroom_id)?
                .unwrap_or_default();
            warn!(
                course = %course.code,
                day = %proposed.day,
                "classroom {} occupied ({} conflicting entries)",
                classroom,
                conflicts.len(),
            );
            return Err(TimetableError::ClassroomConflict {
                classroom,
                conflicts,
            });
        }

        let entry = queries::insert_entry(&tx, proposed)?;
        tx.commit()?;

        info!(
            course = %course.code,
            day = %entry.day,
            "scheduled {} {}-{}",
            entry.day,
            entry.start.format("%H:%M"),
            entry.end.format("%H:%M"),
        );
        Ok(entry)
    }
}

fn overlapping(bookings: &[ConflictingEntry], proposed: &NewScheduleEntry) -> Vec<ConflictingEntry> {
    bookings
        .iter()
        .filter(|b| overlaps(b.start, b.end, proposed.start, proposed.end))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_overlap_strict_both_ends() {
        // Touching at the boundary is not an overlap
        assert!(!overlaps(t(9, 0), t(10, 0), t(10, 0), t(11, 0)));
        assert!(!overlaps(t(10, 0), t(11, 0), t(9, 0), t(10, 0)));

        // Partial and full containment are
        assert!(overlaps(t(9, 0), t(10, 0), t(9, 30), t(10, 30)));
        assert!(overlaps(t(9, 0), t(12, 0), t(10, 0), t(11, 0)));
        assert!(overlaps(t(10, 0), t(11, 0), t(9, 0), t(12, 0)));
        assert!(overlaps(t(9, 0), t(10, 0), t(9, 0), t(10, 0)));
    }

    #[test]
    fn test_overlap_disjoint() {
        assert!(!overlaps(t(8, 0), t(9, 0), t(13, 0), t(14, 0)));
        assert!(!overlaps(t(13, 0), t(14, 0), t(8, 0), t(9, 0)));
    }

    #[test]
    fn test_single_digit_hours_compare_numerically() {
        // "9:00" vs "10:00" breaks under string comparison; NaiveTime
        // ordering must get it right.
        assert!(t(9, 0) < t(10, 0));
        assert!(overlaps(t(9, 30), t(10, 30), t(10, 0), t(11, 0)));
    }
}
