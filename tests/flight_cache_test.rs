use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use scout_dedup::domain::CandidateFlight;
use scout_dedup::error::{DedupError, Result};
use scout_dedup::flight_cache::{CacheStore, FlightDeduplicationCache, InMemoryCacheStore};

fn flight(origin: &str, destination: &str, price: f64) -> CandidateFlight {
    CandidateFlight {
        origin_airport: origin.to_string(),
        destination_airport: destination.to_string(),
        departure_date: NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(),
        departure_time: NaiveTime::from_hms_opt(8, 30, 0),
        airline: Some("TAP".to_string()),
        price_per_person: Some(price),
        total_price: None,
    }
}

// Cache store where every operation errors, to exercise fail-open paths
struct UnreachableCacheStore;

#[async_trait]
impl CacheStore for UnreachableCacheStore {
    async fn exists(&self, _key: &str) -> Result<bool> {
        Err(down())
    }

    async fn set_with_ttl(&self, _key: &str, _value: &str, _ttl_secs: u64) -> Result<()> {
        Err(down())
    }

    async fn exists_many(&self, _keys: &[String]) -> Result<Vec<bool>> {
        Err(down())
    }

    async fn set_many_with_ttl(&self, _entries: &[(String, String)], _ttl_secs: u64) -> Result<()> {
        Err(down())
    }

    async fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>> {
        Err(down())
    }

    async fn delete_many(&self, _keys: &[String]) -> Result<u64> {
        Err(down())
    }
}

fn down() -> DedupError {
    DedupError::Cache {
        message: "connection refused".to_string(),
    }
}

#[tokio::test]
async fn test_cache_round_trip() {
    let cache = FlightDeduplicationCache::new(Arc::new(InMemoryCacheStore::new()));
    let offer = flight("MUC", "LIS", 150.50);

    assert!(!cache.is_flight_cached(&offer).await);
    assert!(cache.cache_flight(&offer).await);
    assert!(cache.is_flight_cached(&offer).await);

    // A different offer stays unseen
    assert!(!cache.is_flight_cached(&flight("MUC", "BCN", 99.90)).await);
}

#[tokio::test]
async fn test_cache_entry_expires_after_ttl() {
    let cache = FlightDeduplicationCache::with_config(
        Arc::new(InMemoryCacheStore::new()),
        1,
        "flight:".to_string(),
    );
    let offer = flight("MUC", "LIS", 150.50);

    assert!(cache.cache_flight(&offer).await);
    assert!(cache.is_flight_cached(&offer).await);

    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert!(!cache.is_flight_cached(&offer).await);
}

#[tokio::test]
async fn test_batch_cache_and_filter() {
    let cache = FlightDeduplicationCache::new(Arc::new(InMemoryCacheStore::new()));

    let seen = vec![flight("MUC", "LIS", 150.50), flight("MUC", "OPO", 120.00)];
    assert_eq!(cache.cache_multiple_flights(&seen).await, 2);

    let batch = vec![
        flight("MUC", "LIS", 150.50),
        flight("MUC", "BCN", 99.90),
        flight("MUC", "OPO", 120.00),
        flight("MUC", "FAO", 180.10),
    ];

    let uncached = cache.filter_uncached_flights(batch).await;
    assert_eq!(uncached.len(), 2);
    assert_eq!(uncached[0].destination_airport, "BCN");
    assert_eq!(uncached[1].destination_airport, "FAO");
}

#[tokio::test]
async fn test_duplicate_offers_share_one_cache_entry() {
    let cache = FlightDeduplicationCache::new(Arc::new(InMemoryCacheStore::new()));

    // Same offer scraped twice with cosmetic differences
    let mut first = flight("muc", "lis", 150.50);
    first.airline = Some("tap".to_string());
    let second = flight("MUC", "LIS", 150.50);

    cache.cache_flight(&first).await;
    assert!(cache.is_flight_cached(&second).await);

    let stats = cache.get_cache_stats().await;
    assert_eq!(stats.total_keys, 1);
}

#[tokio::test]
async fn test_clear_cache_and_stats() {
    let store = Arc::new(InMemoryCacheStore::new());
    let cache = FlightDeduplicationCache::with_config(store.clone(), 3600, "flight:".to_string());

    let offers = vec![flight("MUC", "LIS", 150.50), flight("MUC", "BCN", 99.90)];
    cache.cache_multiple_flights(&offers).await;

    // Keys outside the prefix are not ours to touch
    store
        .set_with_ttl("hotel:xyz", "2025-12-20T08:30:00Z", 3600)
        .await
        .unwrap();

    let stats = cache.get_cache_stats().await;
    assert_eq!(stats.total_keys, 2);
    assert_eq!(stats.key_prefix, "flight:");
    assert_eq!(stats.ttl_secs, 3600);

    assert_eq!(cache.clear_cache().await, 2);
    assert_eq!(cache.get_cache_stats().await.total_keys, 0);
    assert!(store.exists("hotel:xyz").await.unwrap());
}

#[tokio::test]
async fn test_unreachable_store_fails_open() {
    let cache = FlightDeduplicationCache::new(Arc::new(UnreachableCacheStore));
    let offer = flight("MUC", "LIS", 150.50);

    assert!(!cache.is_flight_cached(&offer).await);
    assert!(!cache.cache_flight(&offer).await);
    assert_eq!(cache.cache_multiple_flights(&[offer.clone()]).await, 0);

    let batch = vec![flight("MUC", "LIS", 150.50), flight("MUC", "BCN", 99.90)];
    let uncached = cache.filter_uncached_flights(batch.clone()).await;
    assert_eq!(uncached.len(), batch.len());

    assert_eq!(cache.clear_cache().await, 0);
    assert_eq!(cache.get_cache_stats().await.total_keys, 0);
}
