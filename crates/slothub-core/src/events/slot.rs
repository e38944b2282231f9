//! Slot lifecycle events.

use serde::{Deserialize, Serialize};

use crate::types::id::SlotId;

/// Why a hold ended without a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseReason {
    /// The holder released it explicitly.
    Cancelled,
    /// The lease TTL elapsed without a commit.
    Expired,
}

/// One transition of a slot's lifecycle. Emitted exactly once per
/// transition, after the state change is visible in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlotEvent {
    /// A hold was granted.
    Reserved {
        /// The held slot.
        slot_id: SlotId,
    },
    /// A hold ended and the slot is available again.
    Released {
        /// The released slot.
        slot_id: SlotId,
        /// Explicit release or expiry.
        reason: ReleaseReason,
    },
    /// A hold was committed into a durable booking.
    Booked {
        /// The booked slot.
        slot_id: SlotId,
        /// Name the booking was made under.
        student_name: String,
    },
    /// An admin added a slot.
    Created {
        /// The new slot.
        slot_id: SlotId,
        /// Owning assistant.
        assistant_id: String,
        /// Slot time label.
        time: String,
    },
    /// An admin removed a slot.
    Deleted {
        /// The removed slot.
        slot_id: SlotId,
    },
}

impl SlotEvent {
    /// Short event name (`reserved`, `released`, `booked`, `created`, `deleted`).
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Reserved { .. } => "reserved",
            Self::Released { .. } => "released",
            Self::Booked { .. } => "booked",
            Self::Created { .. } => "created",
            Self::Deleted { .. } => "deleted",
        }
    }

    /// The slot this event concerns.
    pub fn slot_id(&self) -> SlotId {
        match self {
            Self::Reserved { slot_id }
            | Self::Released { slot_id, .. }
            | Self::Booked { slot_id, .. }
            | Self::Created { slot_id, .. }
            | Self::Deleted { slot_id } => *slot_id,
        }
    }
}
