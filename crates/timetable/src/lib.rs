//! University course-timetable manager.
//!
//! Departments, courses, classrooms, and accounts are plain CRUD; the
//! interesting part is the conflict checker in [`scheduler`], which
//! rejects any booking that would double-book an instructor or a
//! classroom in an overlapping slot on the same day.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod scheduler;
pub mod server;
pub mod types;
