//! Durable slot row and creation descriptor.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use slothub_core::types::SlotId;

/// A row of the `timeslots` table.
///
/// Holds are never persisted, so a row is either open or booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SlotRow {
    /// Database-assigned identifier.
    pub timeslot_id: SlotId,
    /// Owning assistant.
    pub assistant_id: String,
    /// Slot time label as entered by the assistant.
    pub time: String,
    /// Whether the slot has a confirmed booking.
    pub booked: bool,
    /// Name the booking was made under.
    pub booked_by: Option<String>,
}

/// Data required to create a new slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSlot {
    /// Owning assistant.
    pub assistant_id: String,
    /// Slot time label.
    pub time: String,
}

impl NewSlot {
    /// Create a descriptor, trimming surrounding whitespace.
    pub fn new(assistant_id: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into().trim().to_string(),
            time: time.into().trim().to_string(),
        }
    }

    /// The uniqueness key of this descriptor.
    pub fn key(&self) -> SlotKey {
        SlotKey {
            assistant_id: self.assistant_id.clone(),
            time: self.time.clone(),
        }
    }
}

/// Uniqueness key of a slot: one slot per assistant per time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    /// Owning assistant.
    pub assistant_id: String,
    /// Slot time label.
    pub time: String,
}
