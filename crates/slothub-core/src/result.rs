//! Convenience result type aliases for SlotHub.

use crate::error::{AppError, BookingError};

/// A specialized `Result` type for infrastructure operations.
///
/// This is defined as a convenience so that every crate does not need to
/// write `Result<T, AppError>` explicitly.
pub type AppResult<T> = Result<T, AppError>;

/// Result of a slot lifecycle operation.
pub type BookingResult<T> = Result<T, BookingError>;
