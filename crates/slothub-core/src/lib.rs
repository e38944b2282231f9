//! # slothub-core
//!
//! Core crate for SlotHub. Contains configuration schemas, typed
//! identifiers, slot lifecycle events, the event sink trait, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other SlotHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, BookingError};
pub use result::{AppResult, BookingResult};
