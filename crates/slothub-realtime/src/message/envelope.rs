//! Envelope wrapping each delivered event with broadcast metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use slothub_core::events::SlotEvent;

/// One event as delivered to a subscriber.
///
/// `seq` increases by one per published event, so a subscriber that sees
/// a gap knows it dropped events and should fetch a fresh snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Broadcaster-wide sequence number.
    pub seq: u64,
    /// When the event was published.
    pub timestamp: DateTime<Utc>,
    /// The transition itself.
    pub event: SlotEvent,
}

impl EventEnvelope {
    /// Wrap an event.
    pub fn new(seq: u64, event: SlotEvent) -> Self {
        Self {
            seq,
            timestamp: Utc::now(),
            event,
        }
    }
}
