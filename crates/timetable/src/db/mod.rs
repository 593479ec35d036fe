//! Storage layer over SQLite: entity CRUD, unique-code enforcement,
//! and referential delete checks.

pub(crate) mod queries;

pub use queries::ScheduleRow;

use chrono::NaiveTime;
use rusqlite::{Connection, OptionalExtension, Row};
use std::sync::Mutex;

use crate::error::{Result, TimetableError};
use crate::models::{
    Account, Classroom, ClassroomUpdate, Course, CourseUpdate, Department, NewAccount,
    NewClassroom, NewCourse, NewDepartment, Role, RoomType, ScheduleEntry, Weekday,
};

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_timetable.sql");

/// Time-of-day persistence format. Zero-padded so the stored text
/// round-trips losslessly; all comparisons happen on `NaiveTime`.
pub(crate) const TIME_FORMAT: &str = "%H:%M";

pub struct TimetableStore {
    pub(crate) conn: Mutex<Connection>,
}

impl TimetableStore {
    /// Opens (or creates) the database at `db_path` and applies the schema.
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::init(conn)
    }

    /// Opens a fresh in-memory database. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // ==================== Departments ====================

    pub fn create_department(&self, dept: &NewDepartment) -> Result<Department> {
        let conn = self.conn.lock().unwrap();
        if code_exists(&conn, "departments", "code", &dept.code)? {
            return Err(TimetableError::DuplicateCode {
                entity: "department",
                code: dept.code.clone(),
            });
        }
        conn.execute(
            "INSERT INTO departments (code, name, created_at) VALUES (?1, ?2, datetime('now'))",
            (&dept.code, &dept.name),
        )?;
        let department_id = conn.last_insert_rowid();
        Ok(Department {
            department_id,
            code: dept.code.clone(),
            name: dept.name.clone(),
        })
    }

    pub fn list_departments(&self) -> Result<Vec<Department>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT department_id, code, name FROM departments ORDER BY code")?;
        let rows = stmt.query_map([], |row| {
            Ok(Department {
                department_id: row.get(0)?,
                code: row.get(1)?,
                name: row.get(2)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Deletes a department unless any course or account still references it.
    pub fn delete_department(&self, department_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let code = entity_code(&conn, "departments", "department_id", department_id)?.ok_or(
            TimetableError::NotFound {
                entity: "department",
                id: department_id,
            },
        )?;

        let courses: i64 = conn.query_row(
            "SELECT COUNT(*) FROM courses WHERE department_id = ?",
            [department_id],
            |row| row.get(0),
        )?;
        let accounts: i64 = conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE department_id = ?",
            [department_id],
            |row| row.get(0),
        )?;
        if courses > 0 || accounts > 0 {
            return Err(TimetableError::ReferentialBlock {
                entity: "department",
                code,
                dependents: format!("{courses} course(s) and {accounts} account(s) reference it"),
            });
        }

        conn.execute(
            "DELETE FROM departments WHERE department_id = ?",
            [department_id],
        )?;
        Ok(())
    }

    // ==================== Courses ====================

    pub fn create_course(&self, course: &NewCourse) -> Result<Course> {
        let conn = self.conn.lock().unwrap();
        if code_exists(&conn, "courses", "code", &course.code)? {
            return Err(TimetableError::DuplicateCode {
                entity: "course",
                code: course.code.clone(),
            });
        }
        require_exists(&conn, "departments", "department_id", course.department_id, "department")?;
        if let Some(instructor_id) = course.instructor_id {
            require_exists(&conn, "accounts", "account_id", instructor_id, "account")?;
        }
        conn.execute(
            "INSERT INTO courses (
                code, name, department_id, instructor_id, semester,
                theory_hours, practice_hours, credits, is_elective, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, datetime('now'))",
            (
                &course.code,
                &course.name,
                course.department_id,
                course.instructor_id,
                course.semester,
                course.theory_hours,
                course.practice_hours,
                course.credits,
                course.is_elective,
            ),
        )?;
        let course_id = conn.last_insert_rowid();
        Ok(Course {
            course_id,
            code: course.code.clone(),
            name: course.name.clone(),
            department_id: course.department_id,
            instructor_id: course.instructor_id,
            semester: course.semester,
            theory_hours: course.theory_hours,
            practice_hours: course.practice_hours,
            credits: course.credits,
            is_elective: course.is_elective,
        })
    }

    pub fn list_courses(&self) -> Result<Vec<Course>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!("{COURSE_SELECT} ORDER BY code"))?;
        let rows = stmt.query_map([], row_to_course)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn get_course(&self, course_id: i64) -> Result<Course> {
        let conn = self.conn.lock().unwrap();
        get_course(&conn, course_id)
    }

    /// Updates the mutable fields of a course. Changing the instructor
    /// does not re-validate existing schedule entries.
    pub fn update_course(&self, course_id: i64, update: &CourseUpdate) -> Result<Course> {
        let conn = self.conn.lock().unwrap();
        require_exists(&conn, "courses", "course_id", course_id, "course")?;
        require_exists(&conn, "departments", "department_id", update.department_id, "department")?;
        if let Some(instructor_id) = update.instructor_id {
            require_exists(&conn, "accounts", "account_id", instructor_id, "account")?;
        }
        conn.execute(
            "UPDATE courses SET
                name = ?1, department_id = ?2, instructor_id = ?3, semester = ?4,
                theory_hours = ?5, practice_hours = ?6, credits = ?7, is_elective = ?8
             WHERE course_id = ?9",
            (
                &update.name,
                update.department_id,
                update.instructor_id,
                update.semester,
                update.theory_hours,
                update.practice_hours,
                update.credits,
                update.is_elective,
                course_id,
            ),
        )?;
        get_course(&conn, course_id)
    }

    /// Deletes a course unless schedule entries still reference it.
    pub fn delete_course(&self, course_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let code = entity_code(&conn, "courses", "course_id", course_id)?.ok_or(
            TimetableError::NotFound {
                entity: "course",
                id: course_id,
            },
        )?;
        let entries: i64 = conn.query_row(
            "SELECT COUNT(*) FROM schedule_entries WHERE course_id = ?",
            [course_id],
            |row| row.get(0),
        )?;
        if entries > 0 {
            return Err(TimetableError::ReferentialBlock {
                entity: "course",
                code,
                dependents: format!("{entries} schedule entries reference it"),
            });
        }
        conn.execute("DELETE FROM courses WHERE course_id = ?", [course_id])?;
        Ok(())
    }

    // ==================== Classrooms ====================

    pub fn create_classroom(&self, room: &NewClassroom) -> Result<Classroom> {
        let conn = self.conn.lock().unwrap();
        if code_exists(&conn, "classrooms", "code", &room.code)? {
            return Err(TimetableError::DuplicateCode {
                entity: "classroom",
                code: room.code.clone(),
            });
        }
        conn.execute(
            "INSERT INTO classrooms (code, capacity, room_type, created_at)
             VALUES (?1, ?2, ?3, datetime('now'))",
            (&room.code, room.capacity, room.room_type.as_str()),
        )?;
        let classroom_id = conn.last_insert_rowid();
        Ok(Classroom {
            classroom_id,
            code: room.code.clone(),
            capacity: room.capacity,
            room_type: room.room_type,
        })
    }

    pub fn list_classrooms(&self) -> Result<Vec<Classroom>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT classroom_id, code, capacity, room_type FROM classrooms ORDER BY code",
        )?;
        let rows = stmt.query_map([], row_to_classroom)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn update_classroom(&self, classroom_id: i64, update: &ClassroomUpdate) -> Result<Classroom> {
        let conn = self.conn.lock().unwrap();
        require_exists(&conn, "classrooms", "classroom_id", classroom_id, "classroom")?;
        conn.execute(
            "UPDATE classrooms SET capacity = ?1, room_type = ?2 WHERE classroom_id = ?3",
            (update.capacity, update.room_type.as_str(), classroom_id),
        )?;
        conn.query_row(
            "SELECT classroom_id, code, capacity, room_type FROM classrooms WHERE classroom_id = ?",
            [classroom_id],
            row_to_classroom,
        )
        .map_err(Into::into)
    }

    /// Deletes a classroom unless schedule entries still reference it.
    pub fn delete_classroom(&self, classroom_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let code = entity_code(&conn, "classrooms", "classroom_id", classroom_id)?.ok_or(
            TimetableError::NotFound {
                entity: "classroom",
                id: classroom_id,
            },
        )?;
        let entries: i64 = conn.query_row(
            "SELECT COUNT(*) FROM schedule_entries WHERE classroom_id = ?",
            [classroom_id],
            |row| row.get(0),
        )?;
        if entries > 0 {
            return Err(TimetableError::ReferentialBlock {
                entity: "classroom",
                code,
                dependents: format!("{entries} schedule entries reference it"),
            });
        }
        conn.execute("DELETE FROM classrooms WHERE classroom_id = ?", [classroom_id])?;
        Ok(())
    }

    // ==================== Accounts ====================

    /// Creates an account. `credential_hash` is produced by the auth
    /// layer; the store never sees the plaintext credential.
    pub fn create_account(&self, account: &NewAccount, credential_hash: &str) -> Result<Account> {
        let conn = self.conn.lock().unwrap();
        if code_exists(&conn, "accounts", "username", &account.username)? {
            return Err(TimetableError::DuplicateCode {
                entity: "account",
                code: account.username.clone(),
            });
        }
        if let Some(department_id) = account.department_id {
            require_exists(&conn, "departments", "department_id", department_id, "department")?;
        }
        conn.execute(
            "INSERT INTO accounts (username, credential_hash, role, display_name, department_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, datetime('now'))",
            (
                &account.username,
                credential_hash,
                account.role.as_str(),
                &account.display_name,
                account.department_id,
            ),
        )?;
        let account_id = conn.last_insert_rowid();
        Ok(Account {
            account_id,
            username: account.username.clone(),
            credential_hash: credential_hash.to_string(),
            role: account.role,
            display_name: account.display_name.clone(),
            department_id: account.department_id,
        })
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!("{ACCOUNT_SELECT} ORDER BY username"))?;
        let rows = stmt.query_map([], row_to_account)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn find_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("{ACCOUNT_SELECT} WHERE username = ?"),
            [username],
            row_to_account,
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn get_account(&self, account_id: i64) -> Result<Account> {
        let conn = self.conn.lock().unwrap();
        get_account(&conn, account_id)
    }

    /// Number of admin-role accounts currently stored.
    pub fn admin_count(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE role = 'admin'",
            [],
            |row| row.get(0),
        )
        .map_err(Into::into)
    }

    /// Deletes an account. Rejected when the target is the acting
    /// account itself, the last remaining admin, or an instructor
    /// still attached to courses.
    pub fn delete_account(&self, account_id: i64, acting_account_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let target = get_account(&conn, account_id)?;

        if account_id == acting_account_id {
            return Err(TimetableError::SelfDeletionBlocked {
                username: target.username,
            });
        }
        if target.role == Role::Admin {
            let admins: i64 = conn.query_row(
                "SELECT COUNT(*) FROM accounts WHERE role = 'admin'",
                [],
                |row| row.get(0),
            )?;
            if admins <= 1 {
                return Err(TimetableError::LastAdminProtection {
                    username: target.username,
                });
            }
        }
        let courses: i64 = conn.query_row(
            "SELECT COUNT(*) FROM courses WHERE instructor_id = ?",
            [account_id],
            |row| row.get(0),
        )?;
        if courses > 0 {
            return Err(TimetableError::ReferentialBlock {
                entity: "account",
                code: target.username,
                dependents: format!("{courses} course(s) list it as instructor"),
            });
        }

        conn.execute("DELETE FROM accounts WHERE account_id = ?", [account_id])?;
        Ok(())
    }
}

// ==================== Row mapping helpers ====================

const COURSE_SELECT: &str = "SELECT course_id, code, name, department_id, instructor_id,
        semester, theory_hours, practice_hours, credits, is_elective
 FROM courses";

const ACCOUNT_SELECT: &str =
    "SELECT account_id, username, credential_hash, role, display_name, department_id
 FROM accounts";

fn row_to_course(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        course_id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        department_id: row.get(3)?,
        instructor_id: row.get(4)?,
        semester: row.get(5)?,
        theory_hours: row.get(6)?,
        practice_hours: row.get(7)?,
        credits: row.get(8)?,
        is_elective: row.get(9)?,
    })
}

fn row_to_classroom(row: &Row<'_>) -> rusqlite::Result<Classroom> {
    let room_type: String = row.get(3)?;
    Ok(Classroom {
        classroom_id: row.get(0)?,
        code: row.get(1)?,
        capacity: row.get(2)?,
        room_type: RoomType::parse(&room_type).unwrap_or(RoomType::Lecture),
    })
}

fn row_to_account(row: &Row<'_>) -> rusqlite::Result<Account> {
    let role: String = row.get(3)?;
    Ok(Account {
        account_id: row.get(0)?,
        username: row.get(1)?,
        credential_hash: row.get(2)?,
        role: Role::parse(&role).unwrap_or(Role::Student),
        display_name: row.get(4)?,
        department_id: row.get(5)?,
    })
}

pub(crate) fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<ScheduleEntry> {
    let day: String = row.get(3)?;
    let start: String = row.get(4)?;
    let end: String = row.get(5)?;
    Ok(ScheduleEntry {
        entry_id: row.get(0)?,
        course_id: row.get(1)?,
        classroom_id: row.get(2)?,
        day: Weekday::parse(&day).unwrap_or(Weekday::Monday),
        start: parse_stored_time(4, &start)?,
        end: parse_stored_time(5, &end)?,
    })
}

pub(crate) fn parse_stored_time(column: usize, text: &str) -> rusqlite::Result<NaiveTime> {
    NaiveTime::parse_from_str(text, TIME_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn get_course(conn: &Connection, course_id: i64) -> Result<Course> {
    conn.query_row(
        &format!("{COURSE_SELECT} WHERE course_id = ?"),
        [course_id],
        row_to_course,
    )
    .optional()?
    .ok_or(TimetableError::NotFound {
        entity: "course",
        id: course_id,
    })
}

pub(crate) fn get_account(conn: &Connection, account_id: i64) -> Result<Account> {
    conn.query_row(
        &format!("{ACCOUNT_SELECT} WHERE account_id = ?"),
        [account_id],
        row_to_account,
    )
    .optional()?
    .ok_or(TimetableError::NotFound {
        entity: "account",
        id: account_id,
    })
}

fn code_exists(conn: &Connection, table: &str, column: &str, value: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?"),
        [value],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub(crate) fn entity_code(
    conn: &Connection,
    table: &str,
    id_column: &str,
    id: i64,
) -> Result<Option<String>> {
    let code_column = if table == "accounts" { "username" } else { "code" };
    conn.query_row(
        &format!("SELECT {code_column} FROM {table} WHERE {id_column} = ?"),
        [id],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

pub(crate) fn require_exists(
    conn: &Connection,
    table: &str,
    id_column: &str,
    id: i64,
    entity: &'static str,
) -> Result<()> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE {id_column} = ?"),
        [id],
        |row| row.get(0),
    )?;
    if count == 0 {
        return Err(TimetableError::NotFound { entity, id });
    }
    Ok(())
}
