//! Session and credential handling.
//!
//! Credentials are stored as hex-encoded sha256 digests; sessions are
//! random tokens held in a concurrent map with a TTL.

use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

use crate::error::{Result, TimetableError};
use crate::models::{Account, Role};

/// Hashes a plaintext credential for storage or comparison.
pub fn hash_credential(credential: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(credential.as_bytes());
    hex::encode(hasher.finalize())
}

/// An authenticated session minted at login.
#[derive(Debug, Clone)]
pub struct Session {
    pub account_id: i64,
    pub username: String,
    pub role: Role,
    started_at: Instant,
    ttl: Duration,
}

impl Session {
    fn expired(&self) -> bool {
        self.started_at.elapsed() >= self.ttl
    }

    /// Errors with `Forbidden` unless the session holds the admin role.
    pub fn require_admin(&self) -> Result<()> {
        if self.role != Role::Admin {
            return Err(TimetableError::Forbidden { required: "admin" });
        }
        Ok(())
    }
}

/// Thread-safe session store keyed by opaque bearer tokens.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Creates a store with an 8-hour session lifetime.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(8 * 60 * 60))
    }

    /// Verifies a credential against an account and mints a token.
    pub fn login(&self, account: &Account, credential: &str) -> Option<String> {
        if hash_credential(credential) != account.credential_hash {
            return None;
        }
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();
        self.sessions.insert(
            token.clone(),
            Session {
                account_id: account.account_id,
                username: account.username.clone(),
                role: account.role,
                started_at: Instant::now(),
                ttl: self.ttl,
            },
        );
        Some(token)
    }

    /// Resolves a token to its session, removing it when expired.
    pub fn get(&self, token: &str) -> Option<Session> {
        let entry = self.sessions.get(token)?;
        if entry.expired() {
            drop(entry);
            self.sessions.remove(token);
            return None;
        }
        Some(entry.clone())
    }

    pub fn logout(&self, token: &str) {
        self.sessions.remove(token);
    }

    /// Drops every session belonging to `account_id`. Called when an
    /// account is deleted so stale tokens stop resolving.
    pub fn revoke_account(&self, account_id: i64) {
        self.sessions.retain(|_, s| s.account_id != account_id);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
