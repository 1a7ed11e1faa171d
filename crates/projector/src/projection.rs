//! Core projection trait.

use async_trait::async_trait;
use event_bus::EventEnvelope;
use read_model::ReadModel;

use crate::Result;

/// Maps one event type onto one read model type.
///
/// `apply` receives the event together with the current read model for the
/// event's entity (None when the entity has not been projected yet) and
/// returns the updated model, or None when the event changes nothing. An
/// update must be derived from `current` (`with_data` and friends) so the
/// version advances; returning a fresh model for an existing entity will be
/// rejected by the repository as a version conflict.
///
/// Projections must be idempotent with respect to redelivery: the bus is
/// at-least-once, and the version check is what turns a duplicate into a
/// no-op instead of a corrupted model.
#[async_trait]
pub trait Projection: Send + Sync {
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Returns the event type this projection consumes.
    fn event_type(&self) -> &'static str;

    /// Returns the read model type this projection produces.
    fn model_type(&self) -> &'static str;

    /// Folds an event into the entity's read model.
    async fn apply(
        &self,
        event: &EventEnvelope,
        current: Option<&ReadModel>,
    ) -> Result<Option<ReadModel>>;
}
