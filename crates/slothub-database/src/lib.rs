//! # slothub-database
//!
//! Durable slot storage for SlotHub: the [`SlotStore`] gateway trait,
//! the PostgreSQL repository behind it, and a process-local store for
//! development and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemorySlotStore;
pub use repositories::SlotRepository;
pub use store::SlotStore;
