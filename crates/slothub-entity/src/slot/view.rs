//! Flat, serializable projection of a slot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use slothub_core::types::SlotId;

use super::status::SlotStatus;

/// Snapshot of one slot as seen by callers and observers.
///
/// The lease token is deliberately absent: only the caller that reserved
/// the slot ever learns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    /// Slot identifier.
    pub id: SlotId,
    /// Owning assistant.
    pub assistant_id: String,
    /// Slot time label.
    pub time: String,
    /// Current status.
    pub status: SlotStatus,
    /// Holder name, when the hold was taken on someone's behalf.
    pub held_by: Option<String>,
    /// Booking name, when booked.
    pub booked_by: Option<String>,
    /// When the current hold lapses.
    pub lease_expires_at: Option<DateTime<Utc>>,
}

impl SlotView {
    /// Whether the slot is booked.
    pub fn is_booked(&self) -> bool {
        self.status == SlotStatus::Booked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_serializes_camel_case() {
        let view = SlotView {
            id: SlotId(1),
            assistant_id: "Jacob1".into(),
            time: "15:00".into(),
            status: SlotStatus::Booked,
            held_by: None,
            booked_by: Some("Alice".into()),
            lease_expires_at: None,
        };
        let json = serde_json::to_value(&view).expect("serialize");
        assert_eq!(json["assistantId"], "Jacob1");
        assert_eq!(json["status"], "booked");
        assert_eq!(json["bookedBy"], "Alice");
        assert!(view.is_booked());
    }
}
