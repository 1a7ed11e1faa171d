use thiserror::Error;

/// Errors that can occur when working with read model data.
#[derive(Debug, Error)]
pub enum ReadModelError {
    /// The data map could not be converted to or from a typed value.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for read model operations.
pub type Result<T> = std::result::Result<T, ReadModelError>;
