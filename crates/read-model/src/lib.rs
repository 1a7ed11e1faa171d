//! Read model data structures for the CQRS query side.
//!
//! A [`ReadModel`] is a denormalized, query-optimized view of domain state,
//! produced by projections from events. Read models are immutable: every
//! update constructor returns a new value with the [`Version`] advanced,
//! which is what lets repositories enforce monotonic versioning.

pub mod error;
pub mod model;
pub mod version;

pub use common::EntityId;
pub use error::{ReadModelError, Result};
pub use model::ReadModel;
pub use version::Version;
