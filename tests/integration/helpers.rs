//! Shared test helpers for integration tests.

use std::sync::Arc;

use slothub_core::config::AppConfig;
use slothub_core::events::SlotEvent;
use slothub_core::types::SlotId;
use slothub_database::MemorySlotStore;
use slothub_entity::slot::SlotRow;
use slothub_realtime::{EventBroadcaster, Subscription};
use slothub_service::BookingContext;

/// Test application context
pub struct TestApp {
    /// The booking core under test
    pub context: BookingContext,
    /// Backing store, for direct row checks
    pub store: Arc<MemorySlotStore>,
    /// Observer attached before any operation ran
    pub observer: Subscription,
}

impl TestApp {
    /// Create a booking core over the given rows
    pub async fn with_rows(rows: Vec<SlotRow>) -> Self {
        let config = AppConfig::default();
        let store = Arc::new(MemorySlotStore::with_rows(rows));
        let broadcaster = Arc::new(EventBroadcaster::new(&config.realtime));
        let context = BookingContext::init(&config, store.clone(), broadcaster)
            .await
            .expect("Failed to init booking context");
        let observer = context.subscribe();

        Self {
            context,
            store,
            observer,
        }
    }

    /// Create a booking core with open slots 1 (15:00) and 2 (16:00)
    pub async fn new() -> Self {
        Self::with_rows(vec![open_row(1, "15:00"), open_row(2, "16:00")]).await
    }

    /// Events observed since the last call
    pub fn events(&mut self) -> Vec<SlotEvent> {
        self.observer.drain().into_iter().map(|e| e.event).collect()
    }

    /// Booking name persisted for `id`, if the row is booked
    pub async fn persisted_booking(&self, id: i64) -> Option<String> {
        self.store
            .row(SlotId(id))
            .await
            .and_then(|row| row.booked.then_some(row.booked_by).flatten())
    }
}

/// An open row owned by assistant `Jacob1`
pub fn open_row(id: i64, time: &str) -> SlotRow {
    SlotRow {
        timeslot_id: SlotId(id),
        assistant_id: "Jacob1".to_string(),
        time: time.to_string(),
        booked: false,
        booked_by: None,
    }
}

/// Let spawned timer tasks run after the clock moved
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
