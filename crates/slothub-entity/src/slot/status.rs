//! Slot status enum.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Externally visible state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    /// Open for reservation.
    Available,
    /// Temporarily held by a lease.
    Held,
    /// Permanently booked.
    Booked,
}

impl SlotStatus {
    /// Whether a new reservation may be granted.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Held => write!(f, "held"),
            Self::Booked => write!(f, "booked"),
        }
    }
}
