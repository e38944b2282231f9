//! Receiving side of a broadcaster subscription.

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::message::EventEnvelope;

/// Unique subscriber identifier
pub type SubscriberId = Uuid;

/// A live subscription. Dropping it unsubscribes on the next publish.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<EventEnvelope>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriberId, receiver: mpsc::Receiver<EventEnvelope>) -> Self {
        Self { id, receiver }
    }

    /// This subscriber's id.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event. Returns `None` once the broadcaster has
    /// dropped this subscriber (shutdown or explicit unsubscribe).
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        self.receiver.recv().await
    }

    /// Take the next event if one is already buffered.
    pub fn try_recv(&mut self) -> Option<EventEnvelope> {
        self.receiver.try_recv().ok()
    }

    /// Drain every buffered event without waiting.
    pub fn drain(&mut self) -> Vec<EventEnvelope> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
