//! Persistence gateway consumed by the booking core.

use async_trait::async_trait;

use slothub_core::result::AppResult;
use slothub_core::types::SlotId;
use slothub_entity::slot::{NewSlot, SlotRow};

/// Durable row storage for slots.
///
/// The core only needs a full load at startup plus point writes. Holds
/// are never written; only confirmed bookings are.
#[async_trait]
pub trait SlotStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load every persisted slot.
    async fn load_all_slots(&self) -> AppResult<Vec<SlotRow>>;

    /// Insert a new open slot and return its assigned id.
    async fn insert_slot(&self, slot: &NewSlot) -> AppResult<SlotId>;

    /// Record a confirmed booking on an existing slot.
    async fn upsert_booking(&self, slot_id: SlotId, student_name: &str) -> AppResult<()>;

    /// Delete a slot row.
    async fn delete_slot(&self, slot_id: SlotId) -> AppResult<()>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
