//! User record storage seam.
//!
//! Persistence of per-user session records is owned by the embedding
//! application: it chooses the backing store and provides any per-user
//! concurrency control. The orchestrator reads a record fresh per
//! operation and writes it back whole, so overlapping operations on the
//! same user are last-write-wins unless the store serializes them (for
//! example with per-key locking or compare-and-swap).

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::UserData;

/// Error type surfaced by user store implementations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Read/write access to per-user session records.
#[async_trait]
pub trait UserDataStore: Send + Sync {
    /// Load a user's record, or `None` if the user has none.
    async fn read(&self, user_id: &str) -> Result<Option<UserData>, StoreError>;

    /// Replace a user's record whole; `None` deletes it.
    async fn write(&self, user_id: &str, data: Option<UserData>) -> Result<(), StoreError>;
}

/// In-memory store for tests and single-process applications.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    records: RwLock<HashMap<String, UserData>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDataStore for MemoryUserStore {
    async fn read(&self, user_id: &str) -> Result<Option<UserData>, StoreError> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn write(&self, user_id: &str, data: Option<UserData>) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        match data {
            Some(data) => {
                records.insert(user_id.to_string(), data);
            }
            None => {
                records.remove(user_id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_missing_user_returns_none() {
        let store = MemoryUserStore::new();
        assert_eq!(store.read("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let store = MemoryUserStore::new();
        let data = UserData {
            refresh_token: Some("refresh-1".to_string()),
            connections: vec!["slack".to_string()],
            ..UserData::default()
        };

        store.write("user-1", Some(data.clone())).await.unwrap();
        assert_eq!(store.read("user-1").await.unwrap(), Some(data));
    }

    #[tokio::test]
    async fn write_none_deletes_record() {
        let store = MemoryUserStore::new();
        store
            .write("user-1", Some(UserData::default()))
            .await
            .unwrap();
        store.write("user-1", None).await.unwrap();
        assert_eq!(store.read("user-1").await.unwrap(), None);
    }
}
