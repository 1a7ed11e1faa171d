use std::collections::HashMap;

use read_model::ReadModel;

/// Builder for criteria queries against read model data fields.
///
/// Each field is an equality match against the model's `data` map. The
/// PostgreSQL repository translates the field set to JSONB containment;
/// in-memory implementations evaluate [`FindCriteria::matches`] directly.
#[derive(Debug, Clone, Default)]
pub struct FindCriteria {
    /// Field values the model's data must contain.
    pub fields: HashMap<String, serde_json::Value>,

    /// Maximum number of models to return.
    pub limit: Option<usize>,

    /// Number of models to skip.
    pub offset: Option<usize>,
}

impl FindCriteria {
    /// Creates empty criteria matching every model of a type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires a data field to equal the given value.
    pub fn field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Limits the number of models returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips this many models before returning results.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true when every criteria field equals the model's data field.
    pub fn matches(&self, model: &ReadModel) -> bool {
        self.fields
            .iter()
            .all(|(key, value)| model.field(key) == Some(value))
    }

    /// Returns the criteria fields as a JSON object, for JSONB containment.
    pub fn fields_as_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}
