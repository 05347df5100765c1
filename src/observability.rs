//! Metric catalog for the deduplication core.
//!
//! Names follow the Prometheus conventions already used by the wider
//! pipeline; the enum eliminates magic strings at emit sites.

use std::fmt;

/// Enum representing all metric names used by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Event dedup metrics
    DedupBatchesProcessed,
    DedupRecordsProcessed,
    DedupExactMerges,
    DedupFuzzyMerges,
    DedupDuplicatesRemoved,
    DedupBatchSize,

    // Persistence metrics
    PersistEventsInserted,
    PersistEventsUpdated,
    PersistEventsSkipped,
    PersistEventsFailed,

    // Flight existence cache metrics
    FlightCacheHits,
    FlightCacheMisses,
    FlightCacheErrors,
    FlightCacheBatchCached,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::DedupBatchesProcessed => "scout_dedup_batches_processed_total",
            MetricName::DedupRecordsProcessed => "scout_dedup_records_processed_total",
            MetricName::DedupExactMerges => "scout_dedup_exact_merges_total",
            MetricName::DedupFuzzyMerges => "scout_dedup_fuzzy_merges_total",
            MetricName::DedupDuplicatesRemoved => "scout_dedup_duplicates_removed_total",
            MetricName::DedupBatchSize => "scout_dedup_batch_size",

            MetricName::PersistEventsInserted => "scout_persist_events_inserted_total",
            MetricName::PersistEventsUpdated => "scout_persist_events_updated_total",
            MetricName::PersistEventsSkipped => "scout_persist_events_skipped_total",
            MetricName::PersistEventsFailed => "scout_persist_events_failed_total",

            MetricName::FlightCacheHits => "scout_flight_cache_hits_total",
            MetricName::FlightCacheMisses => "scout_flight_cache_misses_total",
            MetricName::FlightCacheErrors => "scout_flight_cache_errors_total",
            MetricName::FlightCacheBatchCached => "scout_flight_cache_batch_cached_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn emit_counter(name: MetricName, value: u64) {
    ::metrics::counter!(name.as_str()).increment(value);
}

pub fn emit_gauge(name: MetricName, value: f64) {
    ::metrics::gauge!(name.as_str()).set(value);
}

pub fn emit_histogram(name: MetricName, value: f64) {
    ::metrics::histogram!(name.as_str()).record(value);
}
