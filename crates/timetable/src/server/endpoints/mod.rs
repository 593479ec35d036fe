pub mod accounts;
pub mod classrooms;
pub mod courses;
pub mod departments;
pub mod export;
pub mod schedule;
pub mod session;
pub mod status;
