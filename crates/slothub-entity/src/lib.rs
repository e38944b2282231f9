//! # slothub-entity
//!
//! Domain entity models for SlotHub: the durable slot row, the admin
//! creation descriptor, and the flat slot view handed to callers.

pub mod slot;

pub use slot::{NewSlot, SlotKey, SlotRow, SlotStatus, SlotView};
