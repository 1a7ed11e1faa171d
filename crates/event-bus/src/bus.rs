//! Publish/subscribe bus with broadcast semantics.
//!
//! The bus is the transport layer for events after the write side has
//! accepted them: distribution, not storage. Every subscriber receives a
//! copy of every event published after it subscribed. Delivery is
//! at-least-once and a slow subscriber observes lag instead of blocking
//! publishers, so consumers must be idempotent.

use tokio::sync::broadcast;

use crate::envelope::EventEnvelope;
use crate::error::Result;

/// Default buffer size for in-memory subscriptions.
const DEFAULT_CAPACITY: usize = 1024;

/// Error returned when receiving from a subscription.
#[derive(Debug, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The subscriber fell behind and `skipped` events were dropped.
    /// The subscription is still live; the next `recv` resumes at the
    /// oldest retained event.
    Lagged(u64),

    /// The bus was dropped; no more events will arrive.
    Closed,
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lagged(skipped) => write!(f, "subscription lagged, {skipped} events dropped"),
            Self::Closed => write!(f, "event bus closed"),
        }
    }
}

impl std::error::Error for SubscriptionError {}

/// A subscription to an event stream.
///
/// Each subscription receives a copy of every event published after it was
/// created. Consume with [`EventSubscription::recv`] until
/// [`SubscriptionError::Closed`].
pub struct EventSubscription {
    receiver: broadcast::Receiver<EventEnvelope>,
}

impl EventSubscription {
    /// Waits for the next event.
    pub async fn recv(&mut self) -> std::result::Result<EventEnvelope, SubscriptionError> {
        match self.receiver.recv().await {
            Ok(event) => Ok(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                Err(SubscriptionError::Lagged(skipped))
            }
            Err(broadcast::error::RecvError::Closed) => Err(SubscriptionError::Closed),
        }
    }

    /// Returns the next event if one is already buffered.
    pub fn try_recv(&mut self) -> Option<EventEnvelope> {
        self.receiver.try_recv().ok()
    }
}

/// Publish/subscribe seam for distributing events to projections.
///
/// Implementations must be safe to share across tasks. The in-process
/// implementation is [`InMemoryEventBus`]; a broker-backed transport would
/// implement the same trait.
pub trait EventBus: Send + Sync {
    /// Publishes an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received the event. Zero is
    /// not an error: events published before anyone subscribes are dropped.
    fn publish(&self, event: EventEnvelope) -> Result<usize>;

    /// Creates a new subscription receiving all events published from now on.
    fn subscribe(&self) -> EventSubscription;
}

/// In-process event bus on a tokio broadcast channel.
#[derive(Clone)]
pub struct InMemoryEventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl InMemoryEventBus {
    /// Creates a bus with the default subscription buffer size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a bus whose subscriptions buffer up to `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns the number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for InMemoryEventBus {
    fn publish(&self, event: EventEnvelope) -> Result<usize> {
        // A send error only means there are no subscribers right now.
        Ok(self.sender.send(event).unwrap_or(0))
    }

    fn subscribe(&self) -> EventSubscription {
        EventSubscription {
            receiver: self.sender.subscribe(),
        }
    }
}
