use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{EntityId, Result, Version};

/// A denormalized, query-optimized view of domain state.
///
/// Read models are immutable values. `with_data`, `with_field`, and
/// `with_metadata` return a new model with the version advanced and
/// `updated_at` refreshed; the original is untouched. A model's version
/// therefore increments monotonically across its lifetime, and repositories
/// reject any write that does not advance it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadModel {
    id: EntityId,
    model_type: String,
    version: Version,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    data: HashMap<String, serde_json::Value>,
    metadata: HashMap<String, serde_json::Value>,
}

impl ReadModel {
    /// Creates a fresh read model at version 1.
    pub fn new(
        id: EntityId,
        model_type: impl Into<String>,
        data: HashMap<String, serde_json::Value>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            model_type: model_type.into(),
            version: Version::first(),
            created_at: now,
            updated_at: now,
            data,
            metadata: HashMap::new(),
        }
    }

    /// Creates a fresh read model from a serializable value.
    ///
    /// The value must serialize to a JSON object; its fields become the
    /// model's data map.
    pub fn from_data<T: Serialize>(
        id: EntityId,
        model_type: impl Into<String>,
        data: &T,
    ) -> Result<Self> {
        let value = serde_json::to_value(data)?;
        let data: HashMap<String, serde_json::Value> = serde_json::from_value(value)?;
        Ok(Self::new(id, model_type, data))
    }

    /// Reconstructs a read model from stored parts, preserving its version
    /// and timestamps. Intended for repository implementations.
    pub fn from_parts(
        id: EntityId,
        model_type: impl Into<String>,
        version: Version,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        data: HashMap<String, serde_json::Value>,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            id,
            model_type: model_type.into(),
            version,
            created_at,
            updated_at,
            data,
            metadata,
        }
    }

    /// Returns the entity ID this model is keyed by.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the model type used to namespace storage.
    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    /// Returns the current version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns when the model was first projected.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the model was last updated.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the data map.
    pub fn data(&self) -> &HashMap<String, serde_json::Value> {
        &self.data
    }

    /// Returns the metadata map.
    pub fn metadata(&self) -> &HashMap<String, serde_json::Value> {
        &self.metadata
    }

    /// Returns a single data field, if present.
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Deserializes the data map into a typed value.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(serde_json::to_value(&self.data)?)?)
    }

    /// Returns a new model with the data map replaced and the version advanced.
    pub fn with_data(&self, data: HashMap<String, serde_json::Value>) -> Self {
        Self {
            data,
            version: self.version.next(),
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Returns a new model with one data field set and the version advanced.
    pub fn with_field(&self, key: impl Into<String>, value: serde_json::Value) -> Self {
        let mut data = self.data.clone();
        data.insert(key.into(), value);
        self.with_data(data)
    }

    /// Returns a new model with one metadata entry set and the version advanced.
    pub fn with_metadata(&self, key: impl Into<String>, value: serde_json::Value) -> Self {
        let mut metadata = self.metadata.clone();
        metadata.insert(key.into(), value);
        Self {
            metadata,
            version: self.version.next(),
            updated_at: Utc::now(),
            ..self.clone()
        }
    }
}

impl std::fmt::Display for ReadModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} v{}", self.model_type, self.id, self.version)
    }
}
