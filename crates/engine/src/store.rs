//! Conversation history persistence
//!
//! Histories are keyed per persona so switching coaches never leaks context
//! between them. Entries are stored as serialized JSON with a save
//! timestamp; anything older than the retention window or failing to parse
//! is discarded on load rather than surfaced as an error.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use coach_core::Turn;

use crate::EngineError;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the stored history for a persona. Missing, expired, and corrupt
    /// entries all come back as `None`.
    async fn load(&self, persona_id: &str) -> Option<Vec<Turn>>;

    async fn save(&self, persona_id: &str, turns: &[Turn]) -> Result<(), EngineError>;

    async fn remove(&self, persona_id: &str);
}

struct StoredEntry {
    json: String,
    saved_at: DateTime<Utc>,
}

/// In-memory store, also the reference behavior for other backends.
pub struct MemorySessionStore {
    entries: DashMap<String, StoredEntry>,
    max_age: Duration,
}

impl MemorySessionStore {
    pub fn new(max_age_days: u32) -> Self {
        Self {
            entries: DashMap::new(),
            max_age: Duration::days(i64::from(max_age_days)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, persona_id: &str) -> Option<Vec<Turn>> {
        let entry = self.entries.get(persona_id)?;

        if Utc::now() - entry.saved_at > self.max_age {
            drop(entry);
            self.entries.remove(persona_id);
            tracing::debug!(persona_id, "expired conversation history evicted");
            return None;
        }

        match serde_json::from_str::<Vec<Turn>>(&entry.json) {
            Ok(turns) => Some(turns),
            Err(error) => {
                drop(entry);
                self.entries.remove(persona_id);
                tracing::warn!(persona_id, %error, "discarding corrupt conversation history");
                None
            }
        }
    }

    async fn save(&self, persona_id: &str, turns: &[Turn]) -> Result<(), EngineError> {
        let json =
            serde_json::to_string(turns).map_err(|e| EngineError::Store(e.to_string()))?;
        self.entries.insert(
            persona_id.to_string(),
            StoredEntry {
                json,
                saved_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn remove(&self, persona_id: &str) {
        self.entries.remove(persona_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let store = MemorySessionStore::new(7);
        let turns = vec![Turn::user("hello"), Turn::assistant("hi there")];

        store.save("jules", &turns).await.unwrap();
        let loaded = store.load("jules").await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].content, "hello");
    }

    #[tokio::test]
    async fn test_histories_are_isolated_per_persona() {
        let store = MemorySessionStore::new(7);
        store.save("jules", &[Turn::user("for jules")]).await.unwrap();

        assert!(store.load("dana").await.is_none());
    }

    #[tokio::test]
    async fn test_remove_clears_history() {
        let store = MemorySessionStore::new(7);
        store.save("jules", &[Turn::user("hi")]).await.unwrap();
        store.remove("jules").await;
        assert!(store.load("jules").await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_discarded() {
        let store = MemorySessionStore::new(7);
        store.entries.insert(
            "jules".to_string(),
            StoredEntry {
                json: "{not json".to_string(),
                saved_at: Utc::now(),
            },
        );

        assert!(store.load("jules").await.is_none());
        assert!(!store.entries.contains_key("jules"));
    }

    #[tokio::test]
    async fn test_expired_entry_evicted() {
        let store = MemorySessionStore::new(7);
        store.entries.insert(
            "jules".to_string(),
            StoredEntry {
                json: serde_json::to_string(&[Turn::user("old")]).unwrap(),
                saved_at: Utc::now() - Duration::days(8),
            },
        );

        assert!(store.load("jules").await.is_none());
        assert!(!store.entries.contains_key("jules"));
    }
}
