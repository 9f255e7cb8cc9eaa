//! Persistent storage for the signed-in user
//!
//! The whole session is a single key holding the serialized [`User`].

use common::{
    cache::KeyValueStore,
    error::StoreResult,
    user::User,
};
use std::sync::Arc;
use tracing::warn;

/// Storage key holding the persisted user
pub const USER_STORAGE_KEY: &str = "attendance_user";

/// Reads and writes the persisted user record
#[derive(Clone)]
pub struct SessionStorage {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the persisted user
    ///
    /// A value that no longer decodes is removed so it cannot poison later
    /// reads. Backend failures read as "no user".
    pub async fn load(&self) -> Option<User> {
        let raw = match self.store.get(USER_STORAGE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read stored session: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Discarding unreadable stored session: {}", e);
                if let Err(e) = self.store.delete(USER_STORAGE_KEY).await {
                    warn!("Failed to remove unreadable session: {}", e);
                }
                None
            }
        }
    }

    /// Persist `user`, replacing any previous record
    pub async fn save(&self, user: &User) -> StoreResult<()> {
        let raw = serde_json::to_string(user)?;
        self.store.set(USER_STORAGE_KEY, &raw, None).await
    }

    /// Remove the persisted user
    pub async fn clear(&self) -> StoreResult<()> {
        self.store.delete(USER_STORAGE_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::cache::{FileStore, MemoryStore};
    use uuid::Uuid;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            id_number: "2021-00042".to_string(),
            email: "ana@school.edu".to_string(),
            full_name: "Ana Cruz".to_string(),
            role: "student".to_string(),
            profile_picture: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let store = MemoryStore::new();
        let storage = SessionStorage::new(Arc::new(store.clone()));
        let user = sample_user();

        storage.save(&user).await.expect("save");
        assert_eq!(storage.load().await, Some(user));

        storage.clear().await.expect("clear");
        assert_eq!(storage.load().await, None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_value_is_removed() {
        let store = MemoryStore::new();
        store
            .set(USER_STORAGE_KEY, "{not json", None)
            .await
            .expect("seed");

        let storage = SessionStorage::new(Arc::new(store.clone()));
        assert_eq!(storage.load().await, None);
        assert_eq!(store.get(USER_STORAGE_KEY).await.expect("get"), None);
    }

    #[tokio::test]
    async fn test_file_backed_session_survives_restart() {
        let dir = tempfile::tempdir().expect("tempdir");
        let user = sample_user();

        SessionStorage::new(Arc::new(FileStore::new(dir.path())))
            .save(&user)
            .await
            .expect("save");

        let reopened = SessionStorage::new(Arc::new(FileStore::new(dir.path())));
        assert_eq!(reopened.load().await, Some(user));
    }
}
