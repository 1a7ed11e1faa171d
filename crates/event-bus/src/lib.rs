//! Event distribution for the read-model projection system.
//!
//! This crate provides the transport between the write side and the
//! projections:
//! - [`EventEnvelope`] wraps a domain event with routing metadata
//! - [`EventBus`] is the publish/subscribe seam (broadcast semantics)
//! - [`InMemoryEventBus`] is the in-process implementation on tokio
//!   broadcast channels
//!
//! Delivery is at-least-once and best-effort: slow subscribers observe lag
//! instead of blocking publishers, so consumers must be idempotent.

pub mod bus;
pub mod envelope;
pub mod error;

pub use bus::{EventBus, EventSubscription, InMemoryEventBus, SubscriptionError};
pub use common::EntityId;
pub use envelope::{EventEnvelope, EventEnvelopeBuilder, EventId};
pub use error::{BusError, Result};
