use thiserror::Error;

/// Errors that can occur when publishing to an event bus.
#[derive(Debug, Error)]
pub enum BusError {
    /// The bus transport rejected the event.
    #[error("Publish failed: {0}")]
    Publish(String),

    /// An event payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event bus operations.
pub type Result<T> = std::result::Result<T, BusError>;
