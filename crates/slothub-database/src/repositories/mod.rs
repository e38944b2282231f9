//! Repository implementations backed by PostgreSQL.

pub mod slot;

pub use slot::SlotRepository;
