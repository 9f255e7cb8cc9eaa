//! Server-side sessions kept in the key-value store

use anyhow::Result;
use chrono::Utc;
use common::cache::KeyValueStore;
use rand::{Rng, distributions::Alphanumeric};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::SessionRecord;

const TOKEN_LENGTH: usize = 48;

/// Session manager for handling user sessions
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    ttl_seconds: u64,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(store: Arc<dyn KeyValueStore>, ttl_seconds: u64) -> Self {
        Self { store, ttl_seconds }
    }

    /// Create a session for a user and return its opaque token
    pub async fn create_session(&self, user_id: Uuid) -> Result<String> {
        info!("Creating session for user: {}", user_id);

        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();

        let record = SessionRecord {
            user_id,
            created_at: Utc::now(),
        };
        self.store
            .set(
                &session_key(&token),
                &serde_json::to_string(&record)?,
                Some(self.ttl_seconds),
            )
            .await?;

        Ok(token)
    }

    /// Look up the session behind a token
    pub async fn get_session(&self, token: &str) -> Result<Option<SessionRecord>> {
        if !is_well_formed(token) {
            return Ok(None);
        }

        let Some(raw) = self.store.get(&session_key(token)).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!("Discarding unreadable session record: {}", e);
                self.store.delete(&session_key(token)).await?;
                Ok(None)
            }
        }
    }

    /// Delete the session behind a token
    pub async fn delete_session(&self, token: &str) -> Result<()> {
        if !is_well_formed(token) {
            return Ok(());
        }

        info!("Deleting session");
        self.store.delete(&session_key(token)).await?;

        Ok(())
    }

    /// Session lifetime in seconds
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }
}

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

// Cookie values come from the client, so only tokens we could have issued reach the store
fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LENGTH && token.chars().all(|c| c.is_ascii_alphanumeric())
}
