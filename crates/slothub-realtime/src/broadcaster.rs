//! Event broadcaster that fans every slot transition out to all subscribers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use slothub_core::config::RealtimeConfig;
use slothub_core::events::SlotEvent;
use slothub_core::traits::EventSink;

use crate::message::EventEnvelope;
use crate::metrics::{BroadcastMetrics, MetricsSnapshot};
use crate::subscription::{SubscriberId, Subscription};

/// Best-effort fan-out of slot events.
///
/// Each subscriber owns a bounded buffer. `publish` never waits: a full
/// buffer drops that one delivery and a closed receiver is pruned, so no
/// subscriber can delay or fail delivery to the others. Nothing is
/// retained for subscribers that join later.
#[derive(Debug)]
pub struct EventBroadcaster {
    subscribers: DashMap<SubscriberId, mpsc::Sender<EventEnvelope>>,
    buffer_size: usize,
    seq: AtomicU64,
    closed: AtomicBool,
    metrics: Arc<BroadcastMetrics>,
}

impl EventBroadcaster {
    /// Creates a broadcaster with the configured per-subscriber buffer.
    pub fn new(config: &RealtimeConfig) -> Self {
        Self {
            subscribers: DashMap::new(),
            buffer_size: config.channel_buffer_size.max(1),
            seq: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            metrics: Arc::new(BroadcastMetrics::new()),
        }
    }

    /// Opens a new subscription. Only events published after this call
    /// are delivered.
    ///
    /// After [`close`](Self::close) the returned subscription yields
    /// nothing.
    pub fn subscribe(&self) -> Subscription {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.buffer_size);

        if !self.closed.load(Ordering::SeqCst) {
            self.subscribers.insert(id, tx);
            // A close that ran between the check and the insert has
            // already cleared the map.
            if self.closed.load(Ordering::SeqCst) {
                self.subscribers.remove(&id);
            } else {
                self.metrics.subscribed();
                debug!(subscriber_id = %id, "Subscriber registered");
            }
        }

        Subscription::new(id, rx)
    }

    /// Registers a callback invoked for every subsequent event.
    ///
    /// The handler runs on its own task, so a slow or panicking handler
    /// only affects itself. Must be called from within a Tokio runtime.
    pub fn on_event<F>(&self, handler: F) -> SubscriberId
    where
        F: Fn(EventEnvelope) + Send + Sync + 'static,
    {
        let mut subscription = self.subscribe();
        let id = subscription.id();

        tokio::spawn(async move {
            while let Some(envelope) = subscription.recv().await {
                handler(envelope);
            }
            debug!(subscriber_id = %id, "Event handler stopped");
        });

        id
    }

    /// Drops a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if removed {
            debug!(subscriber_id = %id, "Subscriber removed");
        }
        removed
    }

    /// Number of registered subscribers (including ones not yet pruned).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Delivery counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Drops every subscriber and ignores further publishes.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let count = self.subscribers.len();
        self.subscribers.clear();
        info!(subscribers = count, "Event broadcaster closed");
    }
}

impl EventSink for EventBroadcaster {
    fn publish(&self, event: SlotEvent) {
        if self.closed.load(Ordering::SeqCst) {
            debug!(event = event.event_name(), "Broadcaster closed, event discarded");
            return;
        }

        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let envelope = EventEnvelope::new(seq, event);
        self.metrics.published();

        let mut dead = Vec::new();
        for entry in self.subscribers.iter() {
            match entry.value().try_send(envelope.clone()) {
                Ok(()) => self.metrics.delivered(),
                Err(TrySendError::Full(_)) => {
                    warn!(
                        subscriber_id = %entry.key(),
                        seq,
                        "Subscriber buffer full, dropping event"
                    );
                    self.metrics.dropped();
                }
                Err(TrySendError::Closed(_)) => dead.push(*entry.key()),
            }
        }

        if !dead.is_empty() {
            for id in &dead {
                self.subscribers.remove(id);
            }
            self.metrics.pruned(dead.len() as u64);
            debug!(count = dead.len(), "Pruned closed subscribers");
        }

        debug!(
            event = envelope.event.event_name(),
            slot_id = %envelope.event.slot_id(),
            seq,
            "Event published"
        );
    }
}
