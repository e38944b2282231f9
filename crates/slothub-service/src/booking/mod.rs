//! Booking commit.

pub mod committer;

pub use committer::{BookedSlot, BookingCommitter};
