//! Two-phase event deduplication: exact identity-hash grouping followed by
//! an optional fuzzy pass over the hash-merged records.

pub mod hash;
pub mod merge;
pub mod normalize;
pub mod similarity;
pub mod venue;

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::DEFAULT_FUZZY_THRESHOLD;
use crate::domain::{CandidateEvent, MergedEvent};
use crate::observability::{emit_counter, emit_gauge, MetricName};

pub use hash::generate_deduplication_hash;
pub use normalize::normalize_text;
pub use similarity::{are_events_similar, title_similarity};
pub use venue::VenueExtractor;

/// Result of deduplicating one scraped batch
#[derive(Debug, Clone)]
pub struct DedupOutcome {
    pub events: Vec<MergedEvent>,
    pub duplicates_removed: usize,
}

/// Batch deduplicator for scraped event candidates.
///
/// Pure, synchronous, CPU-bound: each call operates only on its input
/// batch and returns new enriched records, so separate batches can be
/// processed concurrently without shared state.
pub struct Deduplicator {
    fuzzy_threshold: f64,
    venue_extractor: VenueExtractor,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new()
    }
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_FUZZY_THRESHOLD)
    }

    pub fn with_threshold(fuzzy_threshold: f64) -> Self {
        Self {
            fuzzy_threshold,
            venue_extractor: VenueExtractor::new(),
        }
    }

    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    /// Enriches each candidate with an extracted venue (when missing) and
    /// its identity hash, without any grouping. One output per input.
    pub fn enrich_and_hash(&self, events: Vec<CandidateEvent>) -> Vec<MergedEvent> {
        events
            .into_iter()
            .map(|mut event| {
                if event.venue.is_none() {
                    if let Some(description) = event.description.as_deref() {
                        event.venue = self.venue_extractor.extract(description);
                    }
                }

                let event_hash = generate_deduplication_hash(
                    &event.title,
                    event.event_date,
                    &event.destination_city,
                    event.venue.as_deref(),
                );

                merge::singleton(event, event_hash)
            })
            .collect()
    }

    /// Deduplicates a scraped batch.
    ///
    /// Phase 1 groups by identity hash and merges each collision group.
    /// Phase 2 (optional) scans the hash-merged records pairwise and merges
    /// the groups passing the date/city/title-similarity predicate. The
    /// pairwise scan is quadratic, which is acceptable at scraper batch
    /// sizes.
    pub fn deduplicate(&self, events: Vec<CandidateEvent>, use_fuzzy: bool) -> DedupOutcome {
        let total = events.len();
        if total == 0 {
            return DedupOutcome {
                events: Vec::new(),
                duplicates_removed: 0,
            };
        }

        info!("Deduplicating {} candidate events", total);
        emit_counter(MetricName::DedupBatchesProcessed, 1);
        emit_counter(MetricName::DedupRecordsProcessed, total as u64);
        emit_gauge(MetricName::DedupBatchSize, total as f64);

        // Phase 1: group by identity hash, preserving first-seen order
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<MergedEvent>> = HashMap::new();
        for record in self.enrich_and_hash(events) {
            let group = groups
                .entry(record.deduplication_hash.clone())
                .or_insert_with(|| {
                    order.push(record.deduplication_hash.clone());
                    Vec::new()
                });
            group.push(record);
        }

        let mut exact_merges = 0u64;
        let hash_deduplicated: Vec<MergedEvent> = order
            .iter()
            .filter_map(|event_hash| {
                let group = groups.remove(event_hash)?;
                if group.len() > 1 {
                    exact_merges += 1;
                }
                merge::merge_group(group)
            })
            .collect();
        emit_counter(MetricName::DedupExactMerges, exact_merges);

        // Phase 2: fuzzy matching across the hash-merged records
        let unique_events = if use_fuzzy {
            self.fuzzy_pass(hash_deduplicated)
        } else {
            hash_deduplicated
        };

        let duplicates_removed = total - unique_events.len();
        emit_counter(MetricName::DedupDuplicatesRemoved, duplicates_removed as u64);
        info!(
            "Deduplication complete: {} unique events ({} duplicates removed)",
            unique_events.len(),
            duplicates_removed
        );

        DedupOutcome {
            events: unique_events,
            duplicates_removed,
        }
    }

    /// Forward scan: each not-yet-consumed record collects all later
    /// records that pass the similarity predicate, and the collected group
    /// is merged.
    fn fuzzy_pass(&self, records: Vec<MergedEvent>) -> Vec<MergedEvent> {
        if records.len() <= 1 {
            return records;
        }

        let mut slots: Vec<Option<MergedEvent>> = records.into_iter().map(Some).collect();
        let mut unique = Vec::with_capacity(slots.len());

        for i in 0..slots.len() {
            let Some(anchor) = slots[i].take() else { continue };
            let mut group = vec![anchor];

            for slot in slots.iter_mut().skip(i + 1) {
                let is_match = matches!(
                    slot,
                    Some(other)
                        if are_events_similar(&group[0].event, &other.event, self.fuzzy_threshold)
                );
                if is_match {
                    if let Some(other) = slot.take() {
                        group.push(other);
                    }
                }
            }

            if group.len() > 1 {
                debug!(
                    "Fuzzy matched {} records for title '{}'",
                    group.len(),
                    group[0].event.title
                );
                emit_counter(MetricName::DedupFuzzyMerges, 1);
            }

            if let Some(merged) = merge::merge_group(group) {
                unique.push(merged);
            }
        }

        unique
    }
}

/// Deduplicates a batch with the default configuration, returning the
/// unique records and the number of duplicates removed.
pub fn deduplicate_events(
    events: Vec<CandidateEvent>,
    use_fuzzy_matching: bool,
) -> (Vec<MergedEvent>, usize) {
    let outcome = Deduplicator::new().deduplicate(events, use_fuzzy_matching);
    (outcome.events, outcome.duplicates_removed)
}
