//! Test doubles shared by the service tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use slothub_core::error::AppError;
use slothub_core::events::SlotEvent;
use slothub_core::result::AppResult;
use slothub_core::traits::EventSink;
use slothub_core::types::SlotId;
use slothub_database::{MemorySlotStore, SlotStore};
use slothub_entity::slot::{NewSlot, SlotRow};

/// Sink that records every published event in order.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<SlotEvent>>,
}

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<SlotEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(SlotEvent::event_name).collect()
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: SlotEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Memory store whose writes can be made to fail, hang, or wait until
/// resumed.
#[derive(Debug)]
pub(crate) struct FlakyStore {
    inner: MemorySlotStore,
    fail_writes: AtomicBool,
    hang_writes: AtomicBool,
    gate: watch::Sender<bool>,
}

impl Default for FlakyStore {
    fn default() -> Self {
        Self {
            inner: MemorySlotStore::default(),
            fail_writes: AtomicBool::new(false),
            hang_writes: AtomicBool::new(false),
            gate: watch::channel(true).0,
        }
    }
}

impl FlakyStore {
    /// Writes started from now on wait until [`resume_writes`](Self::resume_writes).
    pub(crate) fn pause_writes(&self) {
        self.gate.send_replace(false);
    }

    pub(crate) fn resume_writes(&self) {
        self.gate.send_replace(true);
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn hang_writes(&self, hang: bool) {
        self.hang_writes.store(hang, Ordering::SeqCst);
    }

    pub(crate) fn inner(&self) -> &MemorySlotStore {
        &self.inner
    }

    async fn check_write(&self) -> AppResult<()> {
        let mut gate = self.gate.subscribe();
        while !*gate.borrow_and_update() {
            if gate.changed().await.is_err() {
                break;
            }
        }
        if self.hang_writes.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::database("injected write failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl SlotStore for FlakyStore {
    async fn load_all_slots(&self) -> AppResult<Vec<SlotRow>> {
        self.inner.load_all_slots().await
    }

    async fn insert_slot(&self, slot: &NewSlot) -> AppResult<SlotId> {
        self.check_write().await?;
        self.inner.insert_slot(slot).await
    }

    async fn upsert_booking(&self, slot_id: SlotId, student_name: &str) -> AppResult<()> {
        self.check_write().await?;
        self.inner.upsert_booking(slot_id, student_name).await
    }

    async fn delete_slot(&self, slot_id: SlotId) -> AppResult<()> {
        self.check_write().await?;
        self.inner.delete_slot(slot_id).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Lets spawned timer tasks run after the clock moved.
pub(crate) async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
