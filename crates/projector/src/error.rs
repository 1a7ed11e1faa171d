use thiserror::Error;

/// Errors that can occur while projecting events into read models.
#[derive(Debug, Error)]
pub enum ProjectorError {
    /// The repository rejected or failed a read model operation.
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    /// Failed to deserialize an event payload.
    #[error("Event deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A projection-specific error.
    #[error("Projection error: {0}")]
    Projection(String),
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectorError>;
