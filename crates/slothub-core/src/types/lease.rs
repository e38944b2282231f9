//! Lease grant returned to callers of `reserve`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{LeaseToken, SlotId};

/// Proof of a granted hold. The token must be presented to commit or
/// release the hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseGrant {
    /// The held slot.
    pub slot_id: SlotId,
    /// Token of this lease generation.
    pub token: LeaseToken,
    /// Wall-clock time at which the hold lapses.
    pub expires_at: DateTime<Utc>,
}
