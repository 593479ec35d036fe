//! Shared application state.

use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::db::TimetableStore;

/// State handed to every request handler.
pub struct AppState {
    /// The persistent store behind all timetable operations.
    pub store: TimetableStore,
    /// Active login sessions.
    pub sessions: SessionStore,
    /// Configuration the server was started with.
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: TimetableStore, sessions: SessionStore, config: AppConfig) -> Self {
        Self {
            store,
            sessions,
            config,
        }
    }
}
