//! Unified application error types for SlotHub.
//!
//! Infrastructure code (persistence, configuration, serialization) reports
//! [`AppError`]. Slot lifecycle operations report the narrower
//! [`BookingError`] taxonomy, which maps into `AppError` at the outer
//! boundary.

use std::fmt;
use thiserror::Error;

use crate::types::id::SlotId;
use crate::types::lease::LeaseGrant;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate entry, concurrent modification, etc.).
    Conflict,
    /// An internal server error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An I/O error occurred.
    Io,
    /// The operation did not complete within its time bound.
    Timeout,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Io => write!(f, "IO"),
            Self::Timeout => write!(f, "TIMEOUT"),
        }
    }
}

/// The unified application error used throughout SlotHub.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Io, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

/// Outcome taxonomy of slot lifecycle operations.
///
/// Everything except [`BookingError::PersistenceFailure`] is a pure
/// validation outcome meant for user-facing messaging.
#[derive(Debug, Clone, Error)]
pub enum BookingError {
    /// No slot with this id exists.
    #[error("Timeslot {0} not found")]
    NotFound(SlotId),
    /// The slot is currently held by another lease.
    #[error("Timeslot {0} is already reserved")]
    AlreadyHeld(SlotId),
    /// The slot has already been booked.
    #[error("Timeslot {0} is already booked")]
    AlreadyBooked(SlotId),
    /// The presented token does not belong to the slot's live lease.
    #[error("Lease on timeslot {0} is no longer valid")]
    StaleLease(SlotId),
    /// A slot for the same assistant and time already exists.
    #[error("Timeslot already exists for {assistant_id} at {time}")]
    DuplicateSlot {
        /// Owning assistant.
        assistant_id: String,
        /// Slot time label.
        time: String,
    },
    /// Held slots must be released before removal.
    #[error("Timeslot {0} is reserved and cannot be removed")]
    HeldCannotRemove(SlotId),
    /// A booking on the slot is still being written.
    #[error("Timeslot {0} has a booking being saved and cannot be removed")]
    BookingInFlight(SlotId),
    /// Caller-supplied input was rejected.
    #[error("{0}")]
    InvalidInput(String),
    /// The durable write failed; in-memory state was compensated.
    #[error("Failed to persist timeslot change: {source}")]
    PersistenceFailure {
        /// The affected slot, if it already had an id.
        slot_id: Option<SlotId>,
        /// Replacement lease issued by the rollback, when one was possible.
        retry: Option<LeaseGrant>,
        /// Underlying storage error.
        #[source]
        source: AppError,
    },
}

impl BookingError {
    /// The broad error category of this outcome.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyHeld(_)
            | Self::AlreadyBooked(_)
            | Self::StaleLease(_)
            | Self::DuplicateSlot { .. }
            | Self::HeldCannotRemove(_)
            | Self::BookingInFlight(_) => ErrorKind::Conflict,
            Self::InvalidInput(_) => ErrorKind::Validation,
            Self::PersistenceFailure { .. } => ErrorKind::Database,
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        Self::with_source(kind, message, err)
    }
}
