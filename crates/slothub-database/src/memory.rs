//! Process-local slot store for single-node development and tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use slothub_core::error::AppError;
use slothub_core::result::AppResult;
use slothub_core::types::SlotId;
use slothub_entity::slot::{NewSlot, SlotRow};

use crate::store::SlotStore;

/// In-memory [`SlotStore`]. Enforces the same uniqueness rule as the
/// database schema.
#[derive(Debug)]
pub struct MemorySlotStore {
    rows: RwLock<BTreeMap<SlotId, SlotRow>>,
    next_id: AtomicI64,
}

impl MemorySlotStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Creates a store seeded with existing rows.
    pub fn with_rows(rows: Vec<SlotRow>) -> Self {
        let next = rows.iter().map(|r| r.timeslot_id.get()).max().unwrap_or(0) + 1;
        Self {
            rows: RwLock::new(rows.into_iter().map(|r| (r.timeslot_id, r)).collect()),
            next_id: AtomicI64::new(next),
        }
    }

    /// Returns a copy of one row.
    pub async fn row(&self, slot_id: SlotId) -> Option<SlotRow> {
        self.rows.read().await.get(&slot_id).cloned()
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Whether the store holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl Default for MemorySlotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SlotStore for MemorySlotStore {
    async fn load_all_slots(&self) -> AppResult<Vec<SlotRow>> {
        let mut rows: Vec<SlotRow> = self.rows.read().await.values().cloned().collect();
        rows.sort_by(|a, b| a.time.cmp(&b.time).then(a.timeslot_id.cmp(&b.timeslot_id)));
        Ok(rows)
    }

    async fn insert_slot(&self, slot: &NewSlot) -> AppResult<SlotId> {
        let mut rows = self.rows.write().await;
        let duplicate = rows
            .values()
            .any(|r| r.assistant_id == slot.assistant_id && r.time == slot.time);
        if duplicate {
            return Err(AppError::conflict("Timeslot already exists"));
        }

        let id = SlotId(self.next_id.fetch_add(1, Ordering::SeqCst));
        rows.insert(
            id,
            SlotRow {
                timeslot_id: id,
                assistant_id: slot.assistant_id.clone(),
                time: slot.time.clone(),
                booked: false,
                booked_by: None,
            },
        );
        debug!(slot_id = %id, "Timeslot row inserted (memory)");
        Ok(id)
    }

    async fn upsert_booking(&self, slot_id: SlotId, student_name: &str) -> AppResult<()> {
        let mut rows = self.rows.write().await;
        let row = rows
            .get_mut(&slot_id)
            .ok_or_else(|| AppError::not_found(format!("Timeslot {slot_id} has no durable row")))?;
        row.booked = true;
        row.booked_by = Some(student_name.to_string());
        Ok(())
    }

    async fn delete_slot(&self, slot_id: SlotId) -> AppResult<()> {
        self.rows.write().await.remove(&slot_id);
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
