//! TTL-backed existence cache for flight offers.
//!
//! Flight scrapers re-surface the same offers run after run; hashing the
//! identity fields and remembering them in a keyspace with per-key TTL lets
//! the pipeline skip the expensive comparison work for offers it has
//! already seen. The cache is an optimization only: every operation fails
//! open, so a dead cache store degrades to "nothing was seen" and never
//! gates correctness downstream.

pub mod memory;
pub mod redis;

use std::sync::Arc;

use async_trait::async_trait;
use md5::{Digest, Md5};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_CACHE_KEY_PREFIX, DEFAULT_CACHE_TTL_SECS};
use crate::domain::CandidateFlight;
use crate::error::Result;
use crate::observability::{emit_counter, MetricName};

pub use self::memory::InMemoryCacheStore;
pub use self::redis::RedisCacheStore;

/// Key/value store port with per-key TTL.
///
/// The batch operations are pipelined by the adapter so a whole batch
/// costs one network round trip.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool>;
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;
    async fn exists_many(&self, keys: &[String]) -> Result<Vec<bool>>;
    async fn set_many_with_ttl(&self, entries: &[(String, String)], ttl_secs: u64) -> Result<()>;
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
    async fn delete_many(&self, keys: &[String]) -> Result<u64>;
}

/// Generates the 128-bit identity hash of a flight offer.
///
/// Covers uppercased origin/destination/airline (airline defaults to
/// UNKNOWN), the departure date, the departure time (00:00 when absent),
/// and the per-person price rounded to two decimals, falling back to a
/// quarter of the total price and then 0.0.
pub fn flight_identity_hash(flight: &CandidateFlight) -> String {
    let origin = flight.origin_airport.to_uppercase();
    let destination = flight.destination_airport.to_uppercase();
    let departure_date = flight.departure_date.format("%Y-%m-%d").to_string();
    let departure_time = flight
        .departure_time
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "00:00".to_string());
    let airline = flight
        .airline
        .as_deref()
        .unwrap_or("Unknown")
        .to_uppercase();

    let price = flight
        .price_per_person
        .or_else(|| flight.total_price.map(|total| total / 4.0))
        .unwrap_or(0.0);

    let hash_input = format!(
        "{}_{}_{}_{}_{}_{:.2}",
        origin, destination, departure_date, departure_time, airline, price
    );

    hex::encode(Md5::digest(hash_input.as_bytes()))
}

/// Statistics about the flight cache keyspace
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_keys: usize,
    pub key_prefix: String,
    pub ttl_secs: u64,
}

/// Existence cache for already-processed flight offers.
///
/// There is no client-side mutual exclusion between a lookup and a later
/// write, so two concurrent callers can both see "not cached" for the same
/// offer; downstream logic tolerates the occasional redundant processing.
pub struct FlightDeduplicationCache {
    store: Arc<dyn CacheStore>,
    ttl_secs: u64,
    key_prefix: String,
}

impl FlightDeduplicationCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_config(
            store,
            DEFAULT_CACHE_TTL_SECS,
            DEFAULT_CACHE_KEY_PREFIX.to_string(),
        )
    }

    pub fn with_config(store: Arc<dyn CacheStore>, ttl_secs: u64, key_prefix: String) -> Self {
        info!(
            "Initialized flight deduplication cache (TTL: {}s, prefix: '{}')",
            ttl_secs, key_prefix
        );
        Self {
            store,
            ttl_secs,
            key_prefix,
        }
    }

    fn cache_key(&self, flight: &CandidateFlight) -> String {
        format!("{}{}", self.key_prefix, flight_identity_hash(flight))
    }

    /// Whether this offer was already processed. Fails open: a store error
    /// reads as "not cached".
    pub async fn is_flight_cached(&self, flight: &CandidateFlight) -> bool {
        let cache_key = self.cache_key(flight);

        match self.store.exists(&cache_key).await {
            Ok(true) => {
                debug!("Cache HIT for flight key {}", cache_key);
                emit_counter(MetricName::FlightCacheHits, 1);
                true
            }
            Ok(false) => {
                debug!("Cache MISS for flight key {}", cache_key);
                emit_counter(MetricName::FlightCacheMisses, 1);
                false
            }
            Err(e) => {
                warn!("Error checking flight cache: {}", e);
                emit_counter(MetricName::FlightCacheErrors, 1);
                false
            }
        }
    }

    /// Remembers an offer for the configured TTL. Returns false on store
    /// errors instead of raising.
    pub async fn cache_flight(&self, flight: &CandidateFlight) -> bool {
        let cache_key = self.cache_key(flight);
        let timestamp = chrono::Utc::now().to_rfc3339();

        match self
            .store
            .set_with_ttl(&cache_key, &timestamp, self.ttl_secs)
            .await
        {
            Ok(()) => {
                debug!("Cached flight key {} (TTL: {}s)", cache_key, self.ttl_secs);
                true
            }
            Err(e) => {
                warn!("Error caching flight: {}", e);
                emit_counter(MetricName::FlightCacheErrors, 1);
                false
            }
        }
    }

    /// Caches a whole batch through one pipelined write. Returns the number
    /// of offers cached (zero when the batch write fails).
    pub async fn cache_multiple_flights(&self, flights: &[CandidateFlight]) -> usize {
        if flights.is_empty() {
            return 0;
        }

        let timestamp = chrono::Utc::now().to_rfc3339();
        let entries: Vec<(String, String)> = flights
            .iter()
            .map(|flight| (self.cache_key(flight), timestamp.clone()))
            .collect();

        match self.store.set_many_with_ttl(&entries, self.ttl_secs).await {
            Ok(()) => {
                info!("Cached {} flights in batch operation", entries.len());
                emit_counter(MetricName::FlightCacheBatchCached, entries.len() as u64);
                entries.len()
            }
            Err(e) => {
                warn!("Error in batch caching: {}", e);
                emit_counter(MetricName::FlightCacheErrors, 1);
                0
            }
        }
    }

    /// Returns the subset of offers absent from the cache, preserving
    /// order. The existence checks are pipelined; a store error fails open
    /// and returns the full input.
    pub async fn filter_uncached_flights(
        &self,
        flights: Vec<CandidateFlight>,
    ) -> Vec<CandidateFlight> {
        if flights.is_empty() {
            return flights;
        }

        let keys: Vec<String> = flights.iter().map(|f| self.cache_key(f)).collect();

        let flags = match self.store.exists_many(&keys).await {
            Ok(flags) if flags.len() == keys.len() => flags,
            Ok(_) => {
                warn!("Cache store returned a short existence reply; treating batch as uncached");
                emit_counter(MetricName::FlightCacheErrors, 1);
                return flights;
            }
            Err(e) => {
                warn!("Error filtering flights: {}", e);
                emit_counter(MetricName::FlightCacheErrors, 1);
                return flights;
            }
        };

        let total = flights.len();
        let uncached: Vec<CandidateFlight> = flights
            .into_iter()
            .zip(flags)
            .filter_map(|(flight, cached)| (!cached).then_some(flight))
            .collect();

        info!(
            "Filtered {} flights: {} uncached, {} already cached",
            total,
            uncached.len(),
            total - uncached.len()
        );

        uncached
    }

    /// Deletes every key under the configured prefix. Returns the number of
    /// deleted keys, zero on store errors.
    pub async fn clear_cache(&self) -> u64 {
        let keys = match self.store.keys_with_prefix(&self.key_prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Error clearing cache: {}", e);
                return 0;
            }
        };

        if keys.is_empty() {
            info!("No flight cache entries to clear");
            return 0;
        }

        match self.store.delete_many(&keys).await {
            Ok(deleted) => {
                info!("Cleared {} flight cache entries", deleted);
                deleted
            }
            Err(e) => {
                warn!("Error clearing cache: {}", e);
                0
            }
        }
    }

    /// Keyspace statistics, zeroed on store errors.
    pub async fn get_cache_stats(&self) -> CacheStats {
        let total_keys = match self.store.keys_with_prefix(&self.key_prefix).await {
            Ok(keys) => keys.len(),
            Err(e) => {
                warn!("Error getting cache stats: {}", e);
                0
            }
        };

        CacheStats {
            total_keys,
            key_prefix: self.key_prefix.clone(),
            ttl_secs: self.ttl_secs,
        }
    }
}
