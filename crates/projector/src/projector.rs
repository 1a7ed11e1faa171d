//! Event routing and persistence for registered projections.

use std::collections::HashMap;
use std::sync::Arc;

use event_bus::{EventEnvelope, EventSubscription, SubscriptionError};
use read_model::ReadModel;
use storage::ReadModelRepository;

use crate::Result;
use crate::projection::Projection;

/// Routes events to projections and persists their output.
///
/// Projections are registered up front, keyed by the event type they
/// consume. [`Projector::apply_event`] is the strict single-event path used
/// by tests and synchronous callers; [`Projector::run`] is the best-effort
/// bus loop, where failures are logged and counted but never stop
/// processing.
pub struct Projector {
    repository: Arc<dyn ReadModelRepository>,
    projections: HashMap<String, Vec<Arc<dyn Projection>>>,
}

impl Projector {
    /// Creates a projector writing to the given repository.
    pub fn new(repository: Arc<dyn ReadModelRepository>) -> Self {
        Self {
            repository,
            projections: HashMap::new(),
        }
    }

    /// Registers a projection under the event type it consumes.
    pub fn register(&mut self, projection: Arc<dyn Projection>) {
        self.projections
            .entry(projection.event_type().to_string())
            .or_default()
            .push(projection);
    }

    /// Returns the number of registered projections.
    pub fn projection_count(&self) -> usize {
        self.projections.values().map(Vec::len).sum()
    }

    /// Returns true when at least one projection consumes this event type.
    pub fn handles(&self, event_type: &str) -> bool {
        self.projections.contains_key(event_type)
    }

    /// Applies one event to every projection registered for its type,
    /// persisting each produced read model.
    ///
    /// Returns the models that were saved. Events with no registered
    /// projection are skipped. Errors propagate to the caller; the bus loop
    /// in [`Projector::run`] is where they are swallowed.
    #[tracing::instrument(skip(self, event), fields(event_type = %event.event_type, entity_id = %event.entity_id))]
    pub async fn apply_event(&self, event: &EventEnvelope) -> Result<Vec<ReadModel>> {
        let Some(projections) = self.projections.get(&event.event_type) else {
            metrics::counter!("projector_events_skipped").increment(1);
            tracing::debug!("no projection registered, event skipped");
            return Ok(Vec::new());
        };

        let mut saved = Vec::with_capacity(projections.len());
        for projection in projections {
            let current = self
                .repository
                .get(projection.model_type(), event.entity_id)
                .await?;

            if let Some(model) = projection.apply(event, current.as_ref()).await? {
                saved.push(self.repository.save(model).await?);
            }
        }

        metrics::counter!("projector_events_processed").increment(1);
        Ok(saved)
    }

    /// Consumes a bus subscription until the bus closes.
    ///
    /// Projection and repository failures are logged and dropped; there is
    /// no retry and no coupling back to the event producer. Lag on the
    /// subscription is surfaced the same way.
    pub async fn run(&self, mut subscription: EventSubscription) {
        loop {
            match subscription.recv().await {
                Ok(event) => {
                    if let Err(error) = self.apply_event(&event).await {
                        metrics::counter!("projector_events_failed").increment(1);
                        tracing::error!(
                            %error,
                            event_type = %event.event_type,
                            entity_id = %event.entity_id,
                            "projection failed, event dropped"
                        );
                    }
                }
                Err(SubscriptionError::Lagged(skipped)) => {
                    metrics::counter!("projector_events_lagged").increment(skipped);
                    tracing::warn!(skipped, "subscription lagged, events dropped");
                }
                Err(SubscriptionError::Closed) => {
                    tracing::info!("event bus closed, projector stopping");
                    break;
                }
            }
        }
    }
}
