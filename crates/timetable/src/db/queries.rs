//! Schedule-entry queries: day listings, the conflict scans, and the
//! joined rows the report generator consumes.

use chrono::NaiveTime;
use rusqlite::{Connection, Row};

use super::{row_to_entry, TIME_FORMAT};
use crate::error::Result;
use crate::models::{ConflictingEntry, NewScheduleEntry, ScheduleEntry, Weekday};

use super::TimetableStore;

/// One schedule entry joined with its course, classroom, department,
/// and instructor. Read-only; feeds the export reports.
#[derive(Debug, Clone)]
pub struct ScheduleRow {
    pub entry_id: i64,
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub course_code: String,
    pub course_name: String,
    pub semester: u8,
    pub department_code: String,
    pub classroom_code: String,
    pub instructor_name: Option<String>,
}

const ENTRY_SELECT: &str =
    "SELECT entry_id, course_id, classroom_id, day, start_time, end_time FROM schedule_entries";

const SCHEDULE_ROW_SELECT: &str = "SELECT e.entry_id, e.day, e.start_time, e.end_time,
        c.code, c.name, c.semester, d.code, r.code, a.display_name
 FROM schedule_entries e
 JOIN courses c ON e.course_id = c.course_id
 JOIN departments d ON c.department_id = d.department_id
 JOIN classrooms r ON e.classroom_id = r.classroom_id
 LEFT JOIN accounts a ON c.instructor_id = a.account_id";

impl TimetableStore {
    pub fn list_entries(&self) -> Result<Vec<ScheduleEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare(&format!("{ENTRY_SELECT} ORDER BY day, start_time"))?;
        let rows = stmt.query_map([], row_to_entry)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn entries_for_day(&self, day: Weekday) -> Result<Vec<ScheduleEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare(&format!("{ENTRY_SELECT} WHERE day = ? ORDER BY start_time"))?;
        let rows = stmt.query_map([day.as_str()], row_to_entry)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn delete_entry(&self, entry_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM schedule_entries WHERE entry_id = ?", [entry_id])?;
        if deleted == 0 {
            return Err(crate::error::TimetableError::NotFound {
                entity: "schedule entry",
                id: entry_id,
            });
        }
        Ok(())
    }

    /// All joined rows, ordered for the day-by-day report.
    pub fn schedule_rows(&self) -> Result<Vec<ScheduleRow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "{SCHEDULE_ROW_SELECT} ORDER BY e.day, e.start_time, r.code"
        ))?;
        let rows = stmt.query_map([], row_to_schedule_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }
}

fn row_to_schedule_row(row: &Row<'_>) -> rusqlite::Result<ScheduleRow> {
    let day: String = row.get(1)?;
    let start: String = row.get(2)?;
    let end: String = row.get(3)?;
    Ok(ScheduleRow {
        entry_id: row.get(0)?,
        day: Weekday::parse(&day).unwrap_or(Weekday::Monday),
        start: super::parse_stored_time(2, &start)?,
        end: super::parse_stored_time(3, &end)?,
        course_code: row.get(4)?,
        course_name: row.get(5)?,
        semester: row.get(6)?,
        department_code: row.get(7)?,
        classroom_code: row.get(8)?,
        instructor_name: row.get(9)?,
    })
}

fn row_to_conflicting(row: &Row<'_>) -> rusqlite::Result<ConflictingEntry> {
    let day: String = row.get(0)?;
    let start: String = row.get(1)?;
    let end: String = row.get(2)?;
    Ok(ConflictingEntry {
        day: Weekday::parse(&day).unwrap_or(Weekday::Monday),
        start: super::parse_stored_time(1, &start)?,
        end: super::parse_stored_time(2, &end)?,
        course_code: row.get(3)?,
        classroom_code: row.get(4)?,
    })
}

/// Bookings on `day` whose course is taught by `instructor_id`, with
/// the codes needed for conflict diagnostics. Overlap filtering happens
/// in the scheduler.
pub(crate) fn day_bookings_for_instructor(
    conn: &Connection,
    day: Weekday,
    instructor_id: i64,
) -> rusqlite::Result<Vec<ConflictingEntry>> {
    let mut stmt = conn.prepare(
        "SELECT e.day, e.start_time, e.end_time, c.code, r.code
         FROM schedule_entries e
         JOIN courses c ON e.course_id = c.course_id
         JOIN classrooms r ON e.classroom_id = r.classroom_id
         WHERE e.day = ?1 AND c.instructor_id = ?2
         ORDER BY e.start_time",
    )?;
    let rows = stmt.query_map((day.as_str(), instructor_id), row_to_conflicting)?;
    rows.collect()
}

/// Bookings on `day` in classroom `classroom_id`, with diagnostic codes.
pub(crate) fn day_bookings_in_classroom(
    conn: &Connection,
    day: Weekday,
    classroom_id: i64,
) -> rusqlite::Result<Vec<ConflictingEntry>> {
    let mut stmt = conn.prepare(
        "SELECT e.day, e.start_time, e.end_time, c.code, r.code
         FROM schedule_entries e
         JOIN courses c ON e.course_id = c.course_id
         JOIN classrooms r ON e.classroom_id = r.classroom_id
         WHERE e.day = ?1 AND e.classroom_id = ?2
         ORDER BY e.start_time",
    )?;
    let rows = stmt.query_map((day.as_str(), classroom_id), row_to_conflicting)?;
    rows.collect()
}

/// Writes a validated entry. Only the scheduler calls this, inside the
/// same transaction as the conflict scans.
pub(crate) fn insert_entry(
    conn: &Connection,
    entry: &NewScheduleEntry,
) -> rusqlite::Result<ScheduleEntry> {
    conn.execute(
        "INSERT INTO schedule_entries (course_id, classroom_id, day, start_time, end_time, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))",
        (
            entry.course_id,
            entry.classroom_id,
            entry.day.as_str(),
            entry.start.format(TIME_FORMAT).to_string(),
            entry.end.format(TIME_FORMAT).to_string(),
        ),
    )?;
    Ok(ScheduleEntry {
        entry_id: conn.last_insert_rowid(),
        course_id: entry.course_id,
        classroom_id: entry.classroom_id,
        day: entry.day,
        start: entry.start,
        end: entry.end,
    })
}
