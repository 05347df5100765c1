//! Reconciles deduplicated events against the Event Store.
//!
//! Each incoming record is looked up by identity hash and either inserted,
//! merged into the stored row, or skipped. Mutations happen inside one
//! store transaction per batch; a commit failure rolls everything back.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::dedup::Deduplicator;
use crate::domain::{CandidateEvent, ChangeType, MergedEvent, StoredEvent, PRICE_RANGE_VARIES};
use crate::error::Result;
use crate::observability::{emit_counter, MetricName};
use crate::storage::EventStore;

/// Counts of the per-record outcomes of one save batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duplicates_removed: usize,
}

impl SaveReport {
    pub fn saved_count(&self) -> usize {
        self.inserted + self.updated
    }
}

pub struct EventPersister {
    store: Arc<dyn EventStore>,
    deduplicator: Deduplicator,
}

impl EventPersister {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self::with_deduplicator(store, Deduplicator::new())
    }

    pub fn with_deduplicator(store: Arc<dyn EventStore>, deduplicator: Deduplicator) -> Self {
        Self {
            store,
            deduplicator,
        }
    }

    /// Deduplicates (optionally) and persists a scraped batch.
    ///
    /// Individual record failures are logged and counted, never fatal to
    /// the batch; a commit failure rolls the transaction back and
    /// propagates.
    pub async fn save_events(
        &self,
        events: Vec<CandidateEvent>,
        deduplicate: bool,
    ) -> Result<SaveReport> {
        let mut report = SaveReport::default();

        let merged_events: Vec<MergedEvent> = if deduplicate {
            let outcome = self.deduplicator.deduplicate(events, true);
            report.duplicates_removed = outcome.duplicates_removed;
            outcome.events
        } else {
            // The store lookup still needs venue enrichment and hashes
            self.deduplicator.enrich_and_hash(events)
        };

        if merged_events.is_empty() {
            return Ok(report);
        }

        self.store.begin_transaction().await?;

        for merged in &merged_events {
            match self.reconcile(merged).await {
                Ok(ChangeType::Created) => report.inserted += 1,
                Ok(ChangeType::Updated) => report.updated += 1,
                Ok(ChangeType::Skipped) => report.skipped += 1,
                Err(e) => {
                    warn!("Failed to save event '{}': {}", merged.event.title, e);
                    report.failed += 1;
                }
            }
        }

        if let Err(commit_err) = self.store.commit_transaction().await {
            error!("Error committing events to store: {}", commit_err);
            if let Err(rollback_err) = self.store.rollback_transaction().await {
                error!("Rollback after failed commit also failed: {}", rollback_err);
            }
            return Err(commit_err);
        }

        emit_counter(MetricName::PersistEventsInserted, report.inserted as u64);
        emit_counter(MetricName::PersistEventsUpdated, report.updated as u64);
        emit_counter(MetricName::PersistEventsSkipped, report.skipped as u64);
        emit_counter(MetricName::PersistEventsFailed, report.failed as u64);

        info!(
            "Saved {} events ({} inserted, {} updated, {} skipped, {} failed)",
            report.saved_count(),
            report.inserted,
            report.updated,
            report.skipped,
            report.failed
        );

        Ok(report)
    }

    async fn reconcile(&self, merged: &MergedEvent) -> Result<ChangeType> {
        let now = chrono::Utc::now();

        let existing = self
            .store
            .find_by_deduplication_hash(&merged.deduplication_hash)
            .await?;

        match existing {
            None => {
                let mut row = StoredEvent::from_merged(merged, now);
                self.store.insert_event(&mut row).await?;
                Ok(ChangeType::Created)
            }
            Some(stored) => match merge_into_stored(&stored, &merged.event, now) {
                Some(updated) => {
                    self.store.update_event(&updated).await?;
                    Ok(ChangeType::Updated)
                }
                None => Ok(ChangeType::Skipped),
            },
        }
    }
}

/// Decides whether an incoming record improves the stored row.
///
/// An update happens when the record comes from a different source or
/// carries a strictly longer description. The stored row keeps its own
/// values except: a longer description replaces the old one, venue and url
/// fill in only when missing, the price range is replaced only when the
/// stored value is the generic placeholder, and the scrape timestamp is
/// always refreshed.
fn merge_into_stored(
    stored: &StoredEvent,
    incoming: &CandidateEvent,
    now: chrono::DateTime<chrono::Utc>,
) -> Option<StoredEvent> {
    let stored_desc_len = stored.description.as_deref().map(str::len).unwrap_or(0);
    let incoming_desc_len = incoming.description.as_deref().map(str::len).unwrap_or(0);

    let source_differs = incoming.source != stored.source;
    let richer_description = incoming_desc_len > stored_desc_len;

    if !source_differs && !richer_description {
        return None;
    }

    let mut updated = stored.clone();

    if richer_description {
        updated.description = incoming.description.clone();
    }
    if updated.venue.is_none() {
        updated.venue = incoming.venue.clone();
    }
    if updated.url.is_none() {
        updated.url = incoming.url.clone();
    }
    if updated.price_range.as_deref() == Some(PRICE_RANGE_VARIES) {
        if let Some(price_range) = &incoming.price_range {
            if price_range != PRICE_RANGE_VARIES {
                updated.price_range = Some(price_range.clone());
            }
        }
    }
    updated.scraped_at = now;

    Some(updated)
}
