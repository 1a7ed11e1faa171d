use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use read_model::ReadModel;

use crate::cache::ReadModelCache;
use crate::criteria::FindCriteria;
use crate::repository::ReadModelRepository;
use crate::{EntityId, Result};

/// Repository composed with a write-through cache.
///
/// Reads check the cache first and repopulate on miss; `save` writes the
/// new version through to the cache and `delete` removes the entry, so the
/// cache never serves a record the repository no longer holds (beyond the
/// TTL window of a concurrent read). The inner repository stays the source
/// of truth: cache failures are logged and swallowed, never surfaced.
pub struct HybridReadModelRepository {
    repository: Arc<dyn ReadModelRepository>,
    cache: Arc<dyn ReadModelCache>,
    cache_ttl: Duration,
}

impl HybridReadModelRepository {
    /// Composes a repository with a cache, caching entries for `cache_ttl`.
    pub fn new(
        repository: Arc<dyn ReadModelRepository>,
        cache: Arc<dyn ReadModelCache>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            cache,
            cache_ttl,
        }
    }

    async fn cache_set(&self, model: &ReadModel) {
        if let Err(error) = self.cache.set(model, self.cache_ttl).await {
            tracing::warn!(%error, model = %model, "cache write failed");
        }
    }
}

#[async_trait]
impl ReadModelRepository for HybridReadModelRepository {
    fn name(&self) -> &'static str {
        "hybrid"
    }

    async fn get(&self, model_type: &str, id: EntityId) -> Result<Option<ReadModel>> {
        match self.cache.get(model_type, id).await {
            Ok(Some(model)) => {
                metrics::counter!("hybrid_cache_hits").increment(1);
                return Ok(Some(model));
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(%error, model_type, %id, "cache read failed, using repository");
            }
        }
        metrics::counter!("hybrid_cache_misses").increment(1);

        let model = self.repository.get(model_type, id).await?;
        if let Some(ref model) = model {
            self.cache_set(model).await;
        }
        Ok(model)
    }

    async fn find(&self, model_type: &str, criteria: &FindCriteria) -> Result<Vec<ReadModel>> {
        // Criteria queries are not cached; only point reads are.
        self.repository.find(model_type, criteria).await
    }

    async fn save(&self, model: ReadModel) -> Result<ReadModel> {
        let saved = self.repository.save(model).await?;
        self.cache_set(&saved).await;
        Ok(saved)
    }

    async fn delete(&self, model_type: &str, id: EntityId) -> Result<bool> {
        let deleted = self.repository.delete(model_type, id).await?;
        if let Err(error) = self.cache.delete(model_type, id).await {
            tracing::warn!(%error, model_type, %id, "cache invalidation failed");
        }
        Ok(deleted)
    }

    async fn count(&self, model_type: &str) -> Result<usize> {
        self.repository.count(model_type).await
    }
}
