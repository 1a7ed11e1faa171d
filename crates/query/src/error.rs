use thiserror::Error;

/// Errors that can occur while answering queries.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The underlying repository failed.
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
