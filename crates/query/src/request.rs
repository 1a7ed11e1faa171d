//! Typed query request objects.

use storage::FindCriteria;

use crate::EntityId;

/// Request for a single read model by type and id.
#[derive(Debug, Clone)]
pub struct GetByIdQuery {
    /// The read model type to look in.
    pub model_type: String,

    /// The entity id the model is keyed by.
    pub id: EntityId,
}

impl GetByIdQuery {
    /// Creates a get-by-id request.
    pub fn new(model_type: impl Into<String>, id: EntityId) -> Self {
        Self {
            model_type: model_type.into(),
            id,
        }
    }
}

/// Request for the read models of a type matching criteria.
#[derive(Debug, Clone)]
pub struct FindByQuery {
    /// The read model type to search.
    pub model_type: String,

    /// Field matches plus limit/offset.
    pub criteria: FindCriteria,
}

impl FindByQuery {
    /// Creates a find request matching every model of the type.
    pub fn new(model_type: impl Into<String>) -> Self {
        Self {
            model_type: model_type.into(),
            criteria: FindCriteria::new(),
        }
    }

    /// Replaces the criteria.
    pub fn with_criteria(mut self, criteria: FindCriteria) -> Self {
        self.criteria = criteria;
        self
    }
}
