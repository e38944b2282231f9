//! # slothub-service
//!
//! The slot lifecycle core. Every slot moves through
//! `Available -> Held -> Booked`, with a held slot falling back to
//! `Available` on release or lease expiry.
//!
//! Services follow constructor injection: the shared [`SlotRegistry`],
//! the persistence gateway, and the event sink are handed in as `Arc`s
//! and wired together by [`BookingContext`].

pub mod admin;
pub mod booking;
pub mod context;
pub mod lease;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use admin::SlotAdminService;
pub use booking::{BookedSlot, BookingCommitter};
pub use context::BookingContext;
pub use lease::LeaseManager;
pub use registry::{PendingSlot, RemovedSlot, SlotRegistry};
