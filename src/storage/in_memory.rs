use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::EventStore;
use crate::domain::StoredEvent;
use crate::error::{DedupError, Result};

#[derive(Default, Clone)]
struct Tables {
    events: HashMap<Uuid, StoredEvent>,
    hash_index: HashMap<String, Uuid>,
}

/// In-memory event store for development and testing.
///
/// The transaction bracket snapshots both tables on begin; rollback
/// restores the snapshot, commit discards it.
pub struct InMemoryEventStore {
    tables: Mutex<Tables>,
    snapshot: Mutex<Option<Tables>>,
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            snapshot: Mutex::new(None),
        }
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn begin_transaction(&self) -> Result<()> {
        let tables = self.tables.lock().unwrap();
        *self.snapshot.lock().unwrap() = Some(tables.clone());
        Ok(())
    }

    async fn commit_transaction(&self) -> Result<()> {
        *self.snapshot.lock().unwrap() = None;
        Ok(())
    }

    async fn rollback_transaction(&self) -> Result<()> {
        let snapshot = self.snapshot.lock().unwrap().take();
        if let Some(previous) = snapshot {
            *self.tables.lock().unwrap() = previous;
        }
        Ok(())
    }

    async fn find_by_deduplication_hash(&self, hash: &str) -> Result<Option<StoredEvent>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .hash_index
            .get(hash)
            .and_then(|id| tables.events.get(id))
            .cloned())
    }

    async fn insert_event(&self, event: &mut StoredEvent) -> Result<()> {
        let id = event.id.unwrap_or_else(Uuid::new_v4);
        event.id = Some(id);

        let mut tables = self.tables.lock().unwrap();
        tables
            .hash_index
            .insert(event.deduplication_hash.clone(), id);
        tables.events.insert(id, event.clone());

        debug!("Created event '{}' with id {}", event.title, id);
        Ok(())
    }

    async fn update_event(&self, event: &StoredEvent) -> Result<()> {
        let id = event.id.ok_or_else(|| DedupError::Storage {
            message: "Cannot update event without id".to_string(),
        })?;

        let mut tables = self.tables.lock().unwrap();
        if !tables.events.contains_key(&id) {
            return Err(DedupError::Storage {
                message: format!("No stored event with id {}", id),
            });
        }

        tables
            .hash_index
            .insert(event.deduplication_hash.clone(), id);
        tables.events.insert(id, event.clone());

        debug!("Updated event '{}' with id {}", event.title, id);
        Ok(())
    }

    async fn get_event_by_id(&self, event_id: Uuid) -> Result<Option<StoredEvent>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.events.get(&event_id).cloned())
    }

    async fn get_all_events(&self) -> Result<Vec<StoredEvent>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.events.values().cloned().collect())
    }

    async fn count_events(&self) -> Result<usize> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.events.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn stored(title: &str, hash: &str) -> StoredEvent {
        let now = Utc::now();
        StoredEvent {
            id: None,
            title: title.to_string(),
            event_date: NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(),
            end_date: None,
            destination_city: "Lisbon".to_string(),
            venue: None,
            description: None,
            price_range: Some("varies".to_string()),
            category: "family".to_string(),
            source: "eventbrite".to_string(),
            url: None,
            deduplication_hash: hash.to_string(),
            scraped_at: now,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup_by_hash() {
        let store = InMemoryEventStore::new();
        let mut event = stored("Summer Festival", "abc123");

        store.insert_event(&mut event).await.unwrap();
        assert!(event.id.is_some());

        let found = store.find_by_deduplication_hash("abc123").await.unwrap();
        assert_eq!(found.unwrap().title, "Summer Festival");
        assert!(store
            .find_by_deduplication_hash("missing")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_requires_existing_row() {
        let store = InMemoryEventStore::new();
        let event = stored("Summer Festival", "abc123");
        assert!(store.update_event(&event).await.is_err());
    }

    #[tokio::test]
    async fn test_rollback_restores_snapshot() {
        let store = InMemoryEventStore::new();
        let mut committed = stored("Committed", "hash-1");
        store.insert_event(&mut committed).await.unwrap();

        store.begin_transaction().await.unwrap();
        let mut uncommitted = stored("Uncommitted", "hash-2");
        store.insert_event(&mut uncommitted).await.unwrap();
        assert_eq!(store.count_events().await.unwrap(), 2);

        store.rollback_transaction().await.unwrap();
        assert_eq!(store.count_events().await.unwrap(), 1);
        assert!(store
            .find_by_deduplication_hash("hash-2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_commit_keeps_changes() {
        let store = InMemoryEventStore::new();
        store.begin_transaction().await.unwrap();
        let mut event = stored("Summer Festival", "abc123");
        store.insert_event(&mut event).await.unwrap();
        store.commit_transaction().await.unwrap();

        assert_eq!(store.count_events().await.unwrap(), 1);
    }
}
