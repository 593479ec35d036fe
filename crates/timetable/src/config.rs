//! Application configuration.
//!
//! Loaded from an optional JSON file, then overridden by `TIMETABLE_*`
//! environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Session lifetime in hours.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: u64,
    #[serde(default)]
    pub seed_admin: SeedAdmin,
}

/// Admin account created at startup when no admin exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAdmin {
    pub username: String,
    pub credential: String,
    pub display_name: String,
}

impl Default for SeedAdmin {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            credential: "admin123".to_string(),
            display_name: "System Administrator".to_string(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "timetable.db".to_string()
}

fn default_session_ttl() -> u64 {
    8
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
            session_ttl_hours: default_session_ttl(),
            seed_admin: SeedAdmin::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `path` when it exists, otherwise uses
    /// defaults, then applies environment overrides.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(host) = env::var("TIMETABLE_HOST") {
            self.host = host;
        }
        if let Ok(port) = env::var("TIMETABLE_PORT") {
            if let Ok(port) = port.parse() {
                self.port = port;
            }
        }
        if let Ok(db_path) = env::var("TIMETABLE_DB_PATH") {
            self.db_path = db_path;
        }
        if let Ok(username) = env::var("TIMETABLE_ADMIN_USERNAME") {
            self.seed_admin.username = username;
        }
        if let Ok(credential) = env::var("TIMETABLE_ADMIN_CREDENTIAL") {
            self.seed_admin.credential = credential;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.seed_admin.username, "admin");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"port": 9090}"#).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.db_path, "timetable.db");
    }
}
