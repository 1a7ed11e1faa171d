//! Read model storage for the CQRS query side.
//!
//! Two seams, each with pluggable implementations:
//! - [`ReadModelRepository`] — durable CRUD keyed by (model type, entity id):
//!   [`InMemoryReadModelRepository`], [`PostgresReadModelRepository`], and
//!   [`HybridReadModelRepository`] (repository + cache write-through)
//! - [`ReadModelCache`] — TTL-bounded lookaside cache:
//!   [`InMemoryReadModelCache`] and, behind the `redis` feature,
//!   [`RedisReadModelCache`]
//!
//! Repositories are the source of truth. Cache entries expire by TTL and are
//! invalidated on writes only by the hybrid repository, so other
//! compositions accept a bounded staleness window.

pub mod cache;
pub mod criteria;
pub mod error;
pub mod hybrid;
pub mod memory_cache;
pub mod memory_repository;
pub mod postgres;
#[cfg(feature = "redis")]
pub mod redis_cache;
pub mod repository;

pub use cache::{CacheEntry, CacheLevel, ReadModelCache, cache_key};
pub use common::EntityId;
pub use criteria::FindCriteria;
pub use error::{Result, StorageError};
pub use hybrid::HybridReadModelRepository;
pub use memory_cache::InMemoryReadModelCache;
pub use memory_repository::InMemoryReadModelRepository;
pub use postgres::PostgresReadModelRepository;
#[cfg(feature = "redis")]
pub use redis_cache::RedisReadModelCache;
pub use repository::ReadModelRepository;
