//! Cache-then-repository read path.

use std::sync::Arc;
use std::time::Duration;

use read_model::ReadModel;
use storage::{ReadModelCache, ReadModelRepository};

use crate::request::{FindByQuery, GetByIdQuery};
use crate::{EntityId, Result};

/// Answers queries against read models through a lookaside cache.
///
/// Point reads consult the cache first and repopulate it on miss with the
/// configured TTL. Criteria queries always go to the repository. The cache
/// is an optimization, never a requirement: any cache failure is logged and
/// the read proceeds against the repository.
///
/// There is no invalidation hook tied to repository writes here; unless the
/// repository itself invalidates (the hybrid implementation does), a cached
/// model can lag a write for up to the TTL.
pub struct QueryService {
    repository: Arc<dyn ReadModelRepository>,
    cache: Arc<dyn ReadModelCache>,
    cache_ttl: Duration,
}

impl QueryService {
    /// Creates a query service caching point reads for `cache_ttl`.
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

    /// Returns the TTL applied when repopulating the cache.
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Fetches a single read model, cache first.
    #[tracing::instrument(skip(self, query), fields(model_type = %query.model_type, id = %query.id))]
    pub async fn get_by_id(&self, query: &GetByIdQuery) -> Result<Option<ReadModel>> {
        match self.cache.get(&query.model_type, query.id).await {
            Ok(Some(model)) => {
                metrics::counter!("query_cache_hits").increment(1);
                return Ok(Some(model));
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(%error, "cache read failed, falling back to repository");
            }
        }
        metrics::counter!("query_cache_misses").increment(1);

        let model = self.repository.get(&query.model_type, query.id).await?;

        if let Some(ref model) = model
            && let Err(error) = self.cache.set(model, self.cache_ttl).await
        {
            tracing::warn!(%error, "cache repopulation failed");
        }

        Ok(model)
    }

    /// Fetches the models of a type matching criteria, straight from the
    /// repository.
    #[tracing::instrument(skip(self, query), fields(model_type = %query.model_type))]
    pub async fn find(&self, query: &FindByQuery) -> Result<Vec<ReadModel>> {
        Ok(self
            .repository
            .find(&query.model_type, &query.criteria)
            .await?)
    }

    /// Drops a model from the cache, forcing the next point read to hit the
    /// repository. Returns true if an entry was present.
    pub async fn invalidate(&self, model_type: &str, id: EntityId) -> Result<bool> {
        Ok(self.cache.delete(model_type, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use storage::{
        CacheLevel, FindCriteria, InMemoryReadModelCache, InMemoryReadModelRepository,
        StorageError,
    };

    const TTL: Duration = Duration::from_secs(60);

    fn customer(name: &str) -> ReadModel {
        ReadModel::new(
            EntityId::new(),
            "customer",
            HashMap::from([("name".to_string(), serde_json::json!(name))]),
        )
    }

    fn setup() -> (
        QueryService,
        Arc<InMemoryReadModelRepository>,
        Arc<InMemoryReadModelCache>,
    ) {
        let repository = Arc::new(InMemoryReadModelRepository::new());
        let cache = Arc::new(InMemoryReadModelCache::new());
        let service = QueryService::new(repository.clone(), cache.clone(), TTL);
        (service, repository, cache)
    }

    #[tokio::test]
    async fn miss_reads_repository_and_populates_cache() {
        let (service, repository, cache) = setup();
        let model = customer("Ada");
        repository.save(model.clone()).await.unwrap();

        let fetched = service
            .get_by_id(&GetByIdQuery::new("customer", model.id()))
            .await
            .unwrap();
        assert_eq!(fetched, Some(model.clone()));

        let cached = cache.get("customer", model.id()).await.unwrap();
        assert_eq!(cached, Some(model));
    }

    #[tokio::test]
    async fn hit_is_served_from_cache() {
        let (service, repository, _) = setup();
        let model = customer("Ada");
        repository.save(model.clone()).await.unwrap();

        let query = GetByIdQuery::new("customer", model.id());
        service.get_by_id(&query).await.unwrap();

        // Remove the repository record; the cached copy still answers.
        repository.delete("customer", model.id()).await.unwrap();
        let fetched = service.get_by_id(&query).await.unwrap();
        assert_eq!(fetched, Some(model));
    }

    #[tokio::test]
    async fn expired_entry_falls_back_to_repository() {
        let repository = Arc::new(InMemoryReadModelRepository::new());
        let cache = Arc::new(InMemoryReadModelCache::new());
        let service = QueryService::new(
            repository.clone(),
            cache.clone(),
            Duration::from_millis(10),
        );

        let model = customer("Ada");
        repository.save(model.clone()).await.unwrap();

        let query = GetByIdQuery::new("customer", model.id());
        service.get_by_id(&query).await.unwrap();

        repository.delete("customer", model.id()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        // Cache entry expired and the record is gone: a miss all the way.
        let fetched = service.get_by_id(&query).await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn unknown_model_is_none_and_not_cached() {
        let (service, _, cache) = setup();
        let id = EntityId::new();

        let fetched = service
            .get_by_id(&GetByIdQuery::new("customer", id))
            .await
            .unwrap();
        assert!(fetched.is_none());
        assert_eq!(cache.entry_count().await, 0);
    }

    #[tokio::test]
    async fn find_goes_to_repository() {
        let (service, repository, _) = setup();
        repository.save(customer("Ada")).await.unwrap();
        repository.save(customer("Grace")).await.unwrap();

        let found = service.find(&FindByQuery::new("customer")).await.unwrap();
        assert_eq!(found.len(), 2);

        let limited = service
            .find(&FindByQuery::new("customer").with_criteria(FindCriteria::new().limit(1)))
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_repository_read() {
        let (service, repository, _) = setup();
        let model = customer("Ada");
        repository.save(model.clone()).await.unwrap();

        let query = GetByIdQuery::new("customer", model.id());
        service.get_by_id(&query).await.unwrap();

        let updated = model.with_field("name", serde_json::json!("Grace"));
        // Write directly to the repository; the cache still has version 1.
        repository.save(updated.clone()).await.unwrap();

        assert!(service.invalidate("customer", model.id()).await.unwrap());

        let fetched = service.get_by_id(&query).await.unwrap().unwrap();
        assert_eq!(fetched.version(), updated.version());
    }

    /// A cache that fails every operation.
    struct BrokenCache;

    #[async_trait]
    impl ReadModelCache for BrokenCache {
        fn level(&self) -> CacheLevel {
            CacheLevel::Distributed
        }

        async fn get(
            &self,
            _model_type: &str,
            _id: EntityId,
        ) -> storage::Result<Option<ReadModel>> {
            Err(StorageError::Cache("connection refused".to_string()))
        }

        async fn set(&self, _model: &ReadModel, _ttl: Duration) -> storage::Result<()> {
            Err(StorageError::Cache("connection refused".to_string()))
        }

        async fn delete(&self, _model_type: &str, _id: EntityId) -> storage::Result<bool> {
            Err(StorageError::Cache("connection refused".to_string()))
        }

        async fn clear(&self) -> storage::Result<()> {
            Err(StorageError::Cache("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn broken_cache_degrades_to_repository_reads() {
        let repository = Arc::new(InMemoryReadModelRepository::new());
        let service = QueryService::new(repository.clone(), Arc::new(BrokenCache), TTL);

        let model = customer("Ada");
        repository.save(model.clone()).await.unwrap();

        let fetched = service
            .get_by_id(&GetByIdQuery::new("customer", model.id()))
            .await
            .unwrap();
        assert_eq!(fetched, Some(model));
    }
}
