//! Domain types shared by the store, scheduler, and API layers.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Account roles understood by the authorization layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Instructor,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Instructor => "instructor",
            Role::Student => "student",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "instructor" => Some(Role::Instructor),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

/// The five teaching days. Weekend bookings are not representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Monday" => Some(Weekday::Monday),
            "Tuesday" => Some(Weekday::Tuesday),
            "Wednesday" => Some(Weekday::Wednesday),
            "Thursday" => Some(Weekday::Thursday),
            "Friday" => Some(Weekday::Friday),
            _ => None,
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classroom kinds, matching the two room types the timetable tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {
    Lecture,
    Lab,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Lecture => "Lecture",
            RoomType::Lab => "Lab",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Lecture" => Some(RoomType::Lecture),
            "Lab" => Some(RoomType::Lab),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Department {
    pub department_id: i64,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub course_id: i64,
    pub code: String,
    pub name: String,
    pub department_id: i64,
    pub instructor_id: Option<i64>,
    /// Semester 1..8 within the four-year program.
    pub semester: u8,
    pub theory_hours: u8,
    pub practice_hours: u8,
    pub credits: u8,
    pub is_elective: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Classroom {
    pub classroom_id: i64,
    pub code: String,
    pub capacity: u32,
    pub room_type: RoomType,
}

#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub account_id: i64,
    pub username: String,
    /// Hex-encoded sha256 of the credential; never the credential itself.
    #[serde(skip_serializing)]
    pub credential_hash: String,
    pub role: Role,
    pub display_name: String,
    pub department_id: Option<i64>,
}

/// Serde adapter: times travel as zero-padded "HH:MM" strings.
pub mod time_hhmm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(de)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A single course-classroom-day-time booking.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntry {
    pub entry_id: i64,
    pub course_id: i64,
    pub classroom_id: i64,
    pub day: Weekday,
    #[serde(with = "time_hhmm")]
    pub start: NaiveTime,
    #[serde(with = "time_hhmm")]
    pub end: NaiveTime,
}

/// Diagnostic view of an existing booking that blocked an insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictingEntry {
    pub course_code: String,
    pub classroom_code: String,
    pub day: Weekday,
    #[serde(with = "time_hhmm")]
    pub start: NaiveTime,
    #[serde(with = "time_hhmm")]
    pub end: NaiveTime,
}

impl std::fmt::Display for ConflictingEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, {}-{})",
            self.course_code,
            self.classroom_code,
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
        )
    }
}

// ==================== Creation payloads ====================

#[derive(Debug, Clone, Deserialize)]
pub struct NewDepartment {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
    pub code: String,
    pub name: String,
    pub department_id: i64,
    #[serde(default)]
    pub instructor_id: Option<i64>,
    #[serde(default = "default_semester")]
    pub semester: u8,
    #[serde(default)]
    pub theory_hours: u8,
    #[serde(default)]
    pub practice_hours: u8,
    #[serde(default)]
    pub credits: u8,
    #[serde(default)]
    pub is_elective: bool,
}

fn default_semester() -> u8 {
    1
}

/// Fields an admin may change on an existing course. The code is fixed
/// at creation and never updated.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseUpdate {
    pub name: String,
    pub department_id: i64,
    #[serde(default)]
    pub instructor_id: Option<i64>,
    #[serde(default = "default_semester")]
    pub semester: u8,
    #[serde(default)]
    pub theory_hours: u8,
    #[serde(default)]
    pub practice_hours: u8,
    #[serde(default)]
    pub credits: u8,
    #[serde(default)]
    pub is_elective: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewClassroom {
    pub code: String,
    pub capacity: u32,
    #[serde(default = "default_room_type")]
    pub room_type: RoomType,
}

fn default_room_type() -> RoomType {
    RoomType::Lecture
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassroomUpdate {
    pub capacity: u32,
    pub room_type: RoomType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub credential: String,
    pub role: Role,
    pub display_name: String,
    #[serde(default)]
    pub department_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewScheduleEntry {
    pub course_id: i64,
    pub classroom_id: i64,
    pub day: Weekday,
    #[serde(with = "time_hhmm")]
    pub start: NaiveTime,
    #[serde(with = "time_hhmm")]
    pub end: NaiveTime,
}
