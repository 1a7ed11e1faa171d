//! Read model query endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use common::EntityId;
use query::{FindByQuery, GetByIdQuery, QueryService};
use read_model::ReadModel;
use serde::{Deserialize, Serialize};
use storage::FindCriteria;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub query_service: Arc<QueryService>,
}

// -- Request types --

#[derive(Deserialize, Default)]
pub struct SearchRequest {
    /// Data fields the models must contain, as equality matches.
    #[serde(default)]
    pub criteria: HashMap<String, serde_json::Value>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

// -- Response types --

#[derive(Serialize)]
pub struct ReadModelResponse {
    pub id: String,
    pub model_type: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: HashMap<String, serde_json::Value>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl From<&ReadModel> for ReadModelResponse {
    fn from(model: &ReadModel) -> Self {
        Self {
            id: model.id().to_string(),
            model_type: model.model_type().to_string(),
            version: model.version().as_i64(),
            created_at: model.created_at(),
            updated_at: model.updated_at(),
            data: model.data().clone(),
            metadata: model.metadata().clone(),
        }
    }
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub items: Vec<ReadModelResponse>,
    pub count: usize,
}

// -- Handlers --

/// GET /read-models/{model_type}/{id} — fetch one read model.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path((model_type, id)): Path<(String, String)>,
) -> Result<Json<ReadModelResponse>, ApiError> {
    let id = EntityId::parse(&id).map_err(|e| ApiError::BadRequest(format!("Invalid id: {e}")))?;

    let model = state
        .query_service
        .get_by_id(&GetByIdQuery::new(&model_type, id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No {model_type} read model for {id}")))?;

    Ok(Json(ReadModelResponse::from(&model)))
}

/// POST /read-models/{model_type}/search — find read models by criteria.
#[tracing::instrument(skip(state, req))]
pub async fn search(
    State(state): State<Arc<AppState>>,
    Path(model_type): Path<String>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let mut criteria = FindCriteria::new();
    for (key, value) in req.criteria {
        criteria = criteria.field(key, value);
    }
    if let Some(limit) = req.limit {
        criteria = criteria.limit(limit);
    }
    if let Some(offset) = req.offset {
        criteria = criteria.offset(offset);
    }

    let models = state
        .query_service
        .find(&FindByQuery::new(&model_type).with_criteria(criteria))
        .await?;

    let items: Vec<_> = models.iter().map(ReadModelResponse::from).collect();
    let count = items.len();
    Ok(Json(SearchResponse { items, count }))
}
