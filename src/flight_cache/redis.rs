use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tokio::sync::RwLock;
use tracing::info;

use super::CacheStore;
use crate::error::{DedupError, Result};

fn cache_err(operation: &str, e: redis::RedisError) -> DedupError {
    DedupError::Cache {
        message: format!("{} failed: {}", operation, e),
    }
}

/// Redis-backed cache store over a multiplexed async connection.
pub struct RedisCacheStore {
    connection: RwLock<MultiplexedConnection>,
}

impl RedisCacheStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url).map_err(|e| cache_err("Redis client setup", e))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| cache_err("Redis connect", e))?;

        info!("Connected to Redis cache store at {}", url);
        Ok(Self {
            connection: RwLock::new(connection),
        })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection.write().await;
        let exists: bool = conn
            .exists(key)
            .await
            .map_err(|e| cache_err("EXISTS", e))?;
        Ok(exists)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.connection.write().await;
        let _: () = conn
            .set_ex(key, value, ttl_secs)
            .await
            .map_err(|e| cache_err("SETEX", e))?;
        Ok(())
    }

    async fn exists_many(&self, keys: &[String]) -> Result<Vec<bool>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        // One pipelined round trip for the whole batch
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.exists(key);
        }

        let mut conn = self.connection.write().await;
        let flags: Vec<bool> = pipe
            .query_async(&mut *conn)
            .await
            .map_err(|e| cache_err("pipelined EXISTS", e))?;
        Ok(flags)
    }

    async fn set_many_with_ttl(&self, entries: &[(String, String)], ttl_secs: u64) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        for (key, value) in entries {
            pipe.set_ex(key, value, ttl_secs).ignore();
        }

        let mut conn = self.connection.write().await;
        let _: () = pipe
            .query_async(&mut *conn)
            .await
            .map_err(|e| cache_err("pipelined SETEX", e))?;
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let pattern = format!("{}*", prefix);
        let mut conn = self.connection.write().await;

        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next_cursor, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut *conn)
                .await
                .map_err(|e| cache_err("SCAN", e))?;

            keys.extend(batch);
            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(keys)
    }

    async fn delete_many(&self, keys: &[String]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connection.write().await;
        let deleted: u64 = conn.del(keys).await.map_err(|e| cache_err("DEL", e))?;
        Ok(deleted)
    }
}
