//! Redis-backed read model cache (behind the `redis` cargo feature).
//!
//! Models are stored as JSON strings under namespaced keys with a Redis-side
//! TTL (`SET ... EX`), so expiry needs no sweeping here. A per-namespace set
//! indexes the live keys; `clear` walks it instead of scanning the keyspace.

use std::time::Duration;

use async_trait::async_trait;
use read_model::ReadModel;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use crate::cache::{CacheLevel, ReadModelCache, cache_key};
use crate::{EntityId, Result};

/// Read model cache on a shared Redis instance.
#[derive(Clone)]
pub struct RedisReadModelCache {
    conn: MultiplexedConnection,
    namespace: String,
}

impl RedisReadModelCache {
    /// Connects to Redis. Keys are prefixed with `namespace` so several
    /// caches can share one instance.
    pub async fn connect(url: &str, namespace: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        Ok(Self {
            conn,
            namespace: namespace.into(),
        })
    }

    fn key(&self, model_type: &str, id: EntityId) -> String {
        format!("{}:{}", self.namespace, cache_key(model_type, id))
    }

    fn index_key(&self) -> String {
        format!("{}:keys", self.namespace)
    }
}

#[async_trait]
impl ReadModelCache for RedisReadModelCache {
    fn level(&self) -> CacheLevel {
        CacheLevel::Redis
    }

    async fn get(&self, model_type: &str, id: EntityId) -> Result<Option<ReadModel>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.key(model_type, id)).await?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, model: &ReadModel, ttl: Duration) -> Result<()> {
        let key = self.key(model.model_type(), model.id());
        let json = serde_json::to_string(model)?;
        // EX takes whole seconds; round sub-second TTLs up so an entry is
        // never written already expired.
        let seconds = ttl.as_secs().max(1);

        let mut conn = self.conn.clone();
        let _: () = conn.sadd(self.index_key(), &key).await?;
        let _: () = conn.set_ex(key, json, seconds).await?;
        Ok(())
    }

    async fn delete(&self, model_type: &str, id: EntityId) -> Result<bool> {
        let key = self.key(model_type, id);

        let mut conn = self.conn.clone();
        let _: () = conn.srem(self.index_key(), &key).await?;
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.smembers(self.index_key()).await?;

        if !keys.is_empty() {
            let _: () = conn.del(keys).await?;
        }
        let _: () = conn.del(self.index_key()).await?;
        Ok(())
    }
}
