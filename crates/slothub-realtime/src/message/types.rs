//! Outbound wire messages.
//!
//! Event names follow the `timeslot:<name>` convention clients listen on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use slothub_core::events::{ReleaseReason, SlotEvent};
use slothub_core::types::SlotId;

use super::envelope::EventEnvelope;

/// A slot event in the shape sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum OutboundMessage {
    /// A hold was granted.
    #[serde(rename = "timeslot:reserved", rename_all = "camelCase")]
    Reserved {
        /// Slot id.
        slot_id: SlotId,
        /// Broadcast sequence number.
        seq: u64,
        /// Publish time.
        timestamp: DateTime<Utc>,
    },
    /// A hold ended.
    #[serde(rename = "timeslot:released", rename_all = "camelCase")]
    Released {
        /// Slot id.
        slot_id: SlotId,
        /// Explicit release or expiry.
        reason: ReleaseReason,
        /// Broadcast sequence number.
        seq: u64,
        /// Publish time.
        timestamp: DateTime<Utc>,
    },
    /// A booking was confirmed.
    #[serde(rename = "timeslot:booked", rename_all = "camelCase")]
    Booked {
        /// Slot id.
        slot_id: SlotId,
        /// Booking name.
        student_name: String,
        /// Broadcast sequence number.
        seq: u64,
        /// Publish time.
        timestamp: DateTime<Utc>,
    },
    /// A slot was added.
    #[serde(rename = "timeslot:created", rename_all = "camelCase")]
    Created {
        /// Slot id.
        slot_id: SlotId,
        /// Owning assistant.
        assistant_id: String,
        /// Slot time label.
        time: String,
        /// Always `false` for a new slot.
        booked: bool,
        /// Broadcast sequence number.
        seq: u64,
        /// Publish time.
        timestamp: DateTime<Utc>,
    },
    /// A slot was removed.
    #[serde(rename = "timeslot:deleted", rename_all = "camelCase")]
    Deleted {
        /// Slot id.
        slot_id: SlotId,
        /// Broadcast sequence number.
        seq: u64,
        /// Publish time.
        timestamp: DateTime<Utc>,
    },
}

impl OutboundMessage {
    /// Serialize to a JSON text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&EventEnvelope> for OutboundMessage {
    fn from(envelope: &EventEnvelope) -> Self {
        let seq = envelope.seq;
        let timestamp = envelope.timestamp;
        match &envelope.event {
            SlotEvent::Reserved { slot_id } => Self::Reserved {
                slot_id: *slot_id,
                seq,
                timestamp,
            },
            SlotEvent::Released { slot_id, reason } => Self::Released {
                slot_id: *slot_id,
                reason: *reason,
                seq,
                timestamp,
            },
            SlotEvent::Booked {
                slot_id,
                student_name,
            } => Self::Booked {
                slot_id: *slot_id,
                student_name: student_name.clone(),
                seq,
                timestamp,
            },
            SlotEvent::Created {
                slot_id,
                assistant_id,
                time,
            } => Self::Created {
                slot_id: *slot_id,
                assistant_id: assistant_id.clone(),
                time: time.clone(),
                booked: false,
                seq,
                timestamp,
            },
            SlotEvent::Deleted { slot_id } => Self::Deleted {
                slot_id: *slot_id,
                seq,
                timestamp,
            },
        }
    }
}
