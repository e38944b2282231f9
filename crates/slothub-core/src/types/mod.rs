//! Shared domain types.

pub mod id;
pub mod lease;

pub use id::{LeaseToken, SlotId};
pub use lease::LeaseGrant;
