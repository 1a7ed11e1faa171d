//! The read path of the CQRS pipeline.
//!
//! [`QueryService`] answers typed requests ([`GetByIdQuery`],
//! [`FindByQuery`]) by consulting the cache first, falling back to the
//! repository, and repopulating the cache on miss. Cache failures degrade
//! to repository reads instead of surfacing.

pub mod error;
pub mod request;
pub mod service;

pub use common::EntityId;
pub use error::{QueryError, Result};
pub use request::{FindByQuery, GetByIdQuery};
pub use service::QueryService;
