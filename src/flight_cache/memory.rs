use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::CacheStore;
use crate::error::Result;

/// In-memory cache store with per-key TTL, for development and testing.
pub struct InMemoryCacheStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn purge_expired(entries: &mut HashMap<String, (String, Instant)>) {
        let now = Instant::now();
        entries.retain(|_, (_, expires_at)| *expires_at > now);
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.lock().unwrap();
        Self::purge_expired(&mut entries);
        Ok(entries.contains_key(key))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let expires_at = Instant::now() + Duration::from_secs(ttl_secs);
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn exists_many(&self, keys: &[String]) -> Result<Vec<bool>> {
        let mut entries = self.entries.lock().unwrap();
        Self::purge_expired(&mut entries);
        Ok(keys.iter().map(|key| entries.contains_key(key)).collect())
    }

    async fn set_many_with_ttl(&self, batch: &[(String, String)], ttl_secs: u64) -> Result<()> {
        let expires_at = Instant::now() + Duration::from_secs(ttl_secs);
        let mut entries = self.entries.lock().unwrap();
        for (key, value) in batch {
            entries.insert(key.clone(), (value.clone(), expires_at));
        }
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut entries = self.entries.lock().unwrap();
        Self::purge_expired(&mut entries);
        Ok(entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<u64> {
        let mut entries = self.entries.lock().unwrap();
        let mut deleted = 0;
        for key in keys {
            if entries.remove(key).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_exists() {
        let store = InMemoryCacheStore::new();
        store.set_with_ttl("k1", "v1", 60).await.unwrap();

        assert!(store.exists("k1").await.unwrap());
        assert!(!store.exists("k2").await.unwrap());
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let store = InMemoryCacheStore::new();
        store.set_with_ttl("k1", "v1", 0).await.unwrap();
        assert!(!store.exists("k1").await.unwrap());
    }

    #[tokio::test]
    async fn test_prefix_scoped_listing_and_delete() {
        let store = InMemoryCacheStore::new();
        store.set_with_ttl("flight:a", "v", 60).await.unwrap();
        store.set_with_ttl("flight:b", "v", 60).await.unwrap();
        store.set_with_ttl("hotel:c", "v", 60).await.unwrap();

        let mut keys = store.keys_with_prefix("flight:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["flight:a", "flight:b"]);

        let deleted = store.delete_many(&keys).await.unwrap();
        assert_eq!(deleted, 2);
        assert!(store.exists("hotel:c").await.unwrap());
    }
}
