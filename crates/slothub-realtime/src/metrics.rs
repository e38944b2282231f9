//! Broadcast delivery metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Delivery counters for the broadcaster.
#[derive(Debug, Default)]
pub struct BroadcastMetrics {
    /// Events handed to `publish`.
    pub events_published: AtomicU64,
    /// Individual deliveries that reached a subscriber's buffer.
    pub deliveries: AtomicU64,
    /// Deliveries dropped because a subscriber's buffer was full.
    pub dropped_full: AtomicU64,
    /// Subscribers pruned because their receiver was gone.
    pub subscribers_pruned: AtomicU64,
    /// Subscriptions ever opened.
    pub subscriptions_total: AtomicU64,
}

impl BroadcastMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn delivered(&self) {
        self.deliveries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dropped(&self) {
        self.dropped_full.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn pruned(&self, count: u64) {
        self.subscribers_pruned.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn subscribed(&self) {
        self.subscriptions_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_published: self.events_published.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            dropped_full: self.dropped_full.load(Ordering::Relaxed),
            subscribers_pruned: self.subscribers_pruned.load(Ordering::Relaxed),
            subscriptions_total: self.subscriptions_total.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Events handed to `publish`.
    pub events_published: u64,
    /// Deliveries that reached a subscriber's buffer.
    pub deliveries: u64,
    /// Deliveries dropped on a full buffer.
    pub dropped_full: u64,
    /// Subscribers pruned after disconnecting.
    pub subscribers_pruned: u64,
    /// Subscriptions ever opened.
    pub subscriptions_total: u64,
}
