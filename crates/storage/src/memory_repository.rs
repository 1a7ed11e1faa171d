use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use read_model::ReadModel;
use tokio::sync::RwLock;

use crate::criteria::FindCriteria;
use crate::repository::ReadModelRepository;
use crate::{EntityId, Result, StorageError};

/// In-memory read model repository for tests and single-process deployments.
///
/// Provides the same interface and version semantics as the PostgreSQL
/// implementation.
#[derive(Clone, Default)]
pub struct InMemoryReadModelRepository {
    models: Arc<RwLock<HashMap<(String, EntityId), ReadModel>>>,
}

impl InMemoryReadModelRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of models across all types.
    pub async fn total_count(&self) -> usize {
        self.models.read().await.len()
    }

    /// Clears all models.
    pub async fn clear(&self) {
        self.models.write().await.clear();
    }
}

#[async_trait]
impl ReadModelRepository for InMemoryReadModelRepository {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    async fn get(&self, model_type: &str, id: EntityId) -> Result<Option<ReadModel>> {
        let models = self.models.read().await;
        Ok(models.get(&(model_type.to_string(), id)).cloned())
    }

    async fn find(&self, model_type: &str, criteria: &FindCriteria) -> Result<Vec<ReadModel>> {
        let models = self.models.read().await;
        let mut matching: Vec<_> = models
            .values()
            .filter(|m| m.model_type() == model_type && criteria.matches(m))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then(a.id().cmp(&b.id()))
        });

        let offset = criteria.offset.unwrap_or(0);
        let matching: Vec<_> = matching.into_iter().skip(offset).collect();

        let matching = if let Some(limit) = criteria.limit {
            matching.into_iter().take(limit).collect()
        } else {
            matching
        };

        Ok(matching)
    }

    async fn save(&self, model: ReadModel) -> Result<ReadModel> {
        let key = (model.model_type().to_string(), model.id());
        let mut models = self.models.write().await;

        if let Some(existing) = models.get(&key)
            && existing.version() >= model.version()
        {
            return Err(StorageError::VersionConflict {
                model_type: model.model_type().to_string(),
                id: model.id(),
                current: existing.version(),
                attempted: model.version(),
            });
        }

        models.insert(key, model.clone());
        Ok(model)
    }

    async fn delete(&self, model_type: &str, id: EntityId) -> Result<bool> {
        let mut models = self.models.write().await;
        Ok(models.remove(&(model_type.to_string(), id)).is_some())
    }

    async fn count(&self, model_type: &str) -> Result<usize> {
        let models = self.models.read().await;
        Ok(models
            .values()
            .filter(|m| m.model_type() == model_type)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(name: &str, active: bool) -> ReadModel {
        ReadModel::new(
            EntityId::new(),
            "customer",
            HashMap::from([
                ("name".to_string(), serde_json::json!(name)),
                ("active".to_string(), serde_json::json!(active)),
            ]),
        )
    }

    #[tokio::test]
    async fn save_then_get_roundtrip() {
        let repo = InMemoryReadModelRepository::new();
        let model = customer("Ada", true);

        let saved = repo.save(model.clone()).await.unwrap();
        assert_eq!(saved, model);

        let fetched = repo.get("customer", model.id()).await.unwrap().unwrap();
        assert_eq!(fetched.data(), model.data());
        assert_eq!(fetched.version(), model.version());
    }

    #[tokio::test]
    async fn get_unknown_model_returns_none() {
        let repo = InMemoryReadModelRepository::new();
        assert!(repo.get("customer", EntityId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_update_advances_version() {
        let repo = InMemoryReadModelRepository::new();
        let model = customer("Ada", true);
        repo.save(model.clone()).await.unwrap();

        let updated = model.with_field("active", serde_json::json!(false));
        repo.save(updated.clone()).await.unwrap();

        let fetched = repo.get("customer", model.id()).await.unwrap().unwrap();
        assert_eq!(fetched.version(), updated.version());
        assert_eq!(fetched.field("active"), Some(&serde_json::json!(false)));
    }

    #[tokio::test]
    async fn save_same_version_is_a_conflict() {
        let repo = InMemoryReadModelRepository::new();
        let model = customer("Ada", true);
        repo.save(model.clone()).await.unwrap();

        let result = repo.save(model).await;
        assert!(matches!(result, Err(StorageError::VersionConflict { .. })));
    }

    #[tokio::test]
    async fn save_older_version_is_a_conflict() {
        let repo = InMemoryReadModelRepository::new();
        let model = customer("Ada", true);
        let updated = model.with_field("active", serde_json::json!(false));

        repo.save(updated).await.unwrap();

        let result = repo.save(model).await;
        assert!(matches!(result, Err(StorageError::VersionConflict { .. })));
    }

    #[tokio::test]
    async fn find_filters_by_criteria() {
        let repo = InMemoryReadModelRepository::new();
        repo.save(customer("Ada", true)).await.unwrap();
        repo.save(customer("Grace", true)).await.unwrap();
        repo.save(customer("Edsger", false)).await.unwrap();

        let active = repo
            .find(
                "customer",
                &FindCriteria::new().field("active", serde_json::json!(true)),
            )
            .await
            .unwrap();
        assert_eq!(active.len(), 2);

        let all = repo.find("customer", &FindCriteria::new()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn find_respects_limit_and_offset() {
        let repo = InMemoryReadModelRepository::new();
        for name in ["Ada", "Grace", "Edsger", "Barbara"] {
            repo.save(customer(name, true)).await.unwrap();
        }

        let criteria = FindCriteria::new().limit(2);
        let page1 = repo.find("customer", &criteria).await.unwrap();
        assert_eq!(page1.len(), 2);

        let criteria = FindCriteria::new().limit(2).offset(2);
        let page2 = repo.find("customer", &criteria).await.unwrap();
        assert_eq!(page2.len(), 2);

        // Ordering is deterministic, so pages do not overlap.
        let ids1: Vec<_> = page1.iter().map(|m| m.id()).collect();
        assert!(page2.iter().all(|m| !ids1.contains(&m.id())));
    }

    #[tokio::test]
    async fn find_ignores_other_model_types() {
        let repo = InMemoryReadModelRepository::new();
        repo.save(customer("Ada", true)).await.unwrap();
        repo.save(ReadModel::new(EntityId::new(), "order", HashMap::new()))
            .await
            .unwrap();

        let customers = repo.find("customer", &FindCriteria::new()).await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(repo.count("customer").await.unwrap(), 1);
        assert_eq!(repo.count("order").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_removes_model() {
        let repo = InMemoryReadModelRepository::new();
        let model = customer("Ada", true);
        repo.save(model.clone()).await.unwrap();

        assert!(repo.delete("customer", model.id()).await.unwrap());
        assert!(!repo.delete("customer", model.id()).await.unwrap());
        assert!(repo.get("customer", model.id()).await.unwrap().is_none());
    }
}
