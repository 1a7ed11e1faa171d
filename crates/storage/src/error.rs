use common::EntityId;
use read_model::Version;
use thiserror::Error;

/// Errors that can occur in read model repositories and caches.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A write did not advance the stored version.
    /// Read models are immutable values whose version increments on every
    /// update, so a non-increasing version means a stale or duplicate write.
    #[error(
        "Version conflict for {model_type}/{id}: stored version {current}, attempted {attempted}"
    )]
    VersionConflict {
        model_type: String,
        id: EntityId,
        current: Version,
        attempted: Version,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A Redis command failed.
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A cache backend failed in a way that has no more specific variant.
    #[error("Cache error: {0}")]
    Cache(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
