//! Stored login sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::BackendClient;
use crate::storage::{keys, LocalStorage, StorageResult};

/// Session returned by OTP verification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimpleAuthSession {
    pub user_id: i64,
    pub email: String,
    pub access_token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SimpleAuthSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

/// Reads and writes the user and admin sessions
#[derive(Clone)]
pub struct AuthStore {
    storage: LocalStorage,
}

impl AuthStore {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Current user session; expired or unreadable sessions are removed
    pub fn session(&self) -> Option<SimpleAuthSession> {
        let session = self
            .storage
            .get_json::<SimpleAuthSession>(keys::SIMPLE_AUTH_SESSION);

        match session {
            Some(s) if !s.is_expired(Utc::now()) => Some(s),
            _ => {
                if self.storage.contains(keys::SIMPLE_AUTH_SESSION) {
                    tracing::info!("Discarding expired or unreadable session");
                    if let Err(e) = self.storage.remove(keys::SIMPLE_AUTH_SESSION) {
                        tracing::warn!(error = %e, "Could not remove stale session");
                    }
                }
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    pub fn save_session(&self, session: &SimpleAuthSession) -> StorageResult<()> {
        self.storage.set_json(keys::SIMPLE_AUTH_SESSION, session)
    }

    pub fn logout(&self) -> StorageResult<()> {
        self.storage.remove(keys::SIMPLE_AUTH_SESSION)
    }

    pub fn admin_token(&self) -> Option<String> {
        self.storage.get_string(keys::ADMIN_ACCESS_TOKEN)
    }

    pub fn save_admin_token(&self, token: &str) -> StorageResult<()> {
        self.storage.set_string(keys::ADMIN_ACCESS_TOKEN, token)
    }

    pub fn clear_admin_token(&self) -> StorageResult<()> {
        self.storage.remove(keys::ADMIN_ACCESS_TOKEN)
    }

    /// `client` authenticated as the current user, if logged in
    pub fn user_client(&self, client: &BackendClient) -> Option<BackendClient> {
        self.session().map(|s| client.with_token(s.access_token))
    }

    /// `client` authenticated as admin, if an admin token is stored
    pub fn admin_client(&self, client: &BackendClient) -> Option<BackendClient> {
        self.admin_token().map(|token| client.with_token(token))
    }
}
