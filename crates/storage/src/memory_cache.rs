use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use read_model::ReadModel;
use tokio::sync::RwLock;

use crate::cache::{CacheEntry, CacheLevel, ReadModelCache, cache_key};
use crate::{EntityId, Result};

/// Process-local read model cache.
///
/// Expired entries are dropped lazily on `get`; nothing sweeps the map in
/// the background, so `entry_count` may include entries past their TTL.
#[derive(Clone, Default)]
pub struct InMemoryReadModelCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl InMemoryReadModelCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries, expired or not.
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl ReadModelCache for InMemoryReadModelCache {
    fn level(&self) -> CacheLevel {
        CacheLevel::Memory
    }

    async fn get(&self, model_type: &str, id: EntityId) -> Result<Option<ReadModel>> {
        let key = cache_key(model_type, id);

        let expired = {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            self.entries.write().await.remove(&key);
        }

        Ok(None)
    }

    async fn set(&self, model: &ReadModel, ttl: Duration) -> Result<()> {
        let entry = CacheEntry::new(model.clone(), CacheLevel::Memory, ttl);
        self.entries.write().await.insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn delete(&self, model_type: &str, id: EntityId) -> Result<bool> {
        let key = cache_key(model_type, id);
        Ok(self.entries.write().await.remove(&key).is_some())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}
