//! Event Store port.
//!
//! The production store is the host application's ORM-backed database; this
//! crate only relies on the operations below. The store must index
//! `deduplication_hash` (64-char hex) and allow a nullable `venue` column
//! so the persistence adapter can reconcile incoming batches.

pub mod in_memory;

use crate::domain::StoredEvent;
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

pub use in_memory::InMemoryEventStore;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Opens the batch transaction. One transaction per save batch; the
    /// adapter commits once and rolls back on commit failure.
    async fn begin_transaction(&self) -> Result<()>;
    async fn commit_transaction(&self) -> Result<()>;
    async fn rollback_transaction(&self) -> Result<()>;

    async fn find_by_deduplication_hash(&self, hash: &str) -> Result<Option<StoredEvent>>;
    /// Inserts a new row, assigning `event.id`.
    async fn insert_event(&self, event: &mut StoredEvent) -> Result<()>;
    async fn update_event(&self, event: &StoredEvent) -> Result<()>;

    async fn get_event_by_id(&self, event_id: Uuid) -> Result<Option<StoredEvent>>;
    async fn get_all_events(&self) -> Result<Vec<StoredEvent>>;
    async fn count_events(&self) -> Result<usize>;
}
