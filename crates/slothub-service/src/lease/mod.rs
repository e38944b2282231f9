//! Time-bounded holds on slots.

pub mod manager;
pub(crate) mod timer;

pub use manager::LeaseManager;

use chrono::{DateTime, Utc};

use slothub_core::types::LeaseToken;

use timer::LeaseTimer;

/// A live hold on one slot.
#[derive(Debug)]
pub(crate) struct Lease {
    /// Proof of ownership handed to the holder.
    pub(crate) token: LeaseToken,
    /// Name the hold was taken under, if any.
    pub(crate) holder: Option<String>,
    pub(crate) granted_at: DateTime<Utc>,
    pub(crate) expires_at: DateTime<Utc>,
    /// Expiry task for this lease.
    pub(crate) timer: LeaseTimer,
}
