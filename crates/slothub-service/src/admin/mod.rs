//! Assistant-facing slot management.

pub mod service;

pub use service::SlotAdminService;
