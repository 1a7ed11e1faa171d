use async_trait::async_trait;
use read_model::ReadModel;

use crate::criteria::FindCriteria;
use crate::{EntityId, Result};

/// Durable storage for read models, keyed by (model type, entity id).
///
/// A repository holds the latest version of each read model and is the
/// source of truth for the query side. `save` must reject writes whose
/// version does not advance the stored one, so at-least-once event delivery
/// surfaces duplicates as version conflicts instead of silent overwrites.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ReadModelRepository: Send + Sync {
    /// Returns the name of this repository implementation.
    fn name(&self) -> &'static str;

    /// Fetches a read model by type and id.
    async fn get(&self, model_type: &str, id: EntityId) -> Result<Option<ReadModel>>;

    /// Returns the models of a type matching the criteria, ordered by
    /// creation time then id.
    async fn find(&self, model_type: &str, criteria: &FindCriteria) -> Result<Vec<ReadModel>>;

    /// Persists a read model, returning the stored value.
    ///
    /// Fails with [`crate::StorageError::VersionConflict`] if the stored
    /// version is not lower than the model's version.
    async fn save(&self, model: ReadModel) -> Result<ReadModel>;

    /// Deletes a read model. Returns true if a record was removed.
    async fn delete(&self, model_type: &str, id: EntityId) -> Result<bool>;

    /// Returns the number of stored models of a type.
    async fn count(&self, model_type: &str) -> Result<usize>;
}
