//! Cache seam and entry types.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use read_model::ReadModel;
use serde::{Deserialize, Serialize};

use crate::{EntityId, Result};

/// Where a cache entry lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheLevel {
    /// Process-local memory.
    Memory,
    /// A Redis instance shared by the service's processes.
    Redis,
    /// An external distributed cache tier.
    Distributed,
}

impl std::fmt::Display for CacheLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Redis => write!(f, "redis"),
            Self::Distributed => write!(f, "distributed"),
        }
    }
}

/// Returns the canonical cache key for a read model.
pub fn cache_key(model_type: &str, id: EntityId) -> String {
    format!("{model_type}:{id}")
}

/// A cached read model with its expiry.
///
/// Entries never outlive their TTL: `is_expired` is checked on every read
/// and expired entries are dropped. The TTL is the only bound on staleness
/// relative to the repository unless a write-through composition (the hybrid
/// repository) invalidates eagerly.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The canonical key, `"{model_type}:{id}"`.
    pub key: String,

    /// The cached read model.
    pub value: ReadModel,

    /// The tier this entry lives in.
    pub level: CacheLevel,

    /// When this entry stops being served.
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates an entry expiring `ttl` from now.
    pub fn new(value: ReadModel, level: CacheLevel, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            key: cache_key(value.model_type(), value.id()),
            value,
            level,
            expires_at,
        }
    }

    /// Returns true once the entry's TTL has elapsed.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// TTL-bounded lookaside cache for read models.
///
/// `get` returns only live entries; expired and missing keys are both
/// misses. Implementations must be safe to share across tasks.
#[async_trait]
pub trait ReadModelCache: Send + Sync {
    /// Returns the tier this cache stores entries in.
    fn level(&self) -> CacheLevel;

    /// Looks up a read model, returning None on miss or expiry.
    async fn get(&self, model_type: &str, id: EntityId) -> Result<Option<ReadModel>>;

    /// Stores a read model for `ttl`, replacing any previous entry.
    async fn set(&self, model: &ReadModel, ttl: Duration) -> Result<()>;

    /// Removes a read model. Returns true if an entry was present.
    async fn delete(&self, model_type: &str, id: EntityId) -> Result<bool>;

    /// Removes every entry.
    async fn clear(&self) -> Result<()>;
}
