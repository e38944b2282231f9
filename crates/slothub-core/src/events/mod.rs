//! Domain events emitted by slot lifecycle operations.
//!
//! Events are handed to an [`EventSink`](crate::traits::EventSink) after
//! each transition and consumed by the real-time broadcaster.

pub mod slot;

pub use slot::{ReleaseReason, SlotEvent};
