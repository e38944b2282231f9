//! Authoritative in-memory store of slots and their lifecycle state.
//!
//! Each slot lives behind its own `tokio::sync::Mutex`; the registry
//! indexes them in a `DashMap`, so transitions on different slots never
//! contend and there is no global lock.

pub mod pending;
pub(crate) mod record;
pub mod removal;

pub use pending::PendingSlot;
pub use removal::RemovedSlot;
pub(crate) use record::{SlotRecord, SlotState};

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

use slothub_core::error::BookingError;
use slothub_core::result::BookingResult;
use slothub_core::types::SlotId;
use slothub_entity::slot::{NewSlot, SlotKey, SlotRow, SlotStatus, SlotView};

pub(crate) type SlotCell = Arc<Mutex<SlotRecord>>;

/// Logs and aborts on a slot observed in a state no transition can
/// produce.
#[track_caller]
pub(crate) fn invariant_violation(slot_id: SlotId, detail: &str) -> ! {
    error!(slot_id = %slot_id, detail, "Slot invariant violated");
    panic!("slot {slot_id} invariant violated: {detail}");
}

/// All known slots, keyed by id, plus the `(assistant, time)` uniqueness
/// index.
#[derive(Debug, Default)]
pub struct SlotRegistry {
    /// Slot records by id.
    slots: DashMap<SlotId, SlotCell>,
    /// Claimed keys. `None` marks a claim whose durable insert is in flight.
    keys: DashMap<SlotKey, Option<SlotId>>,
}

impl SlotRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an `Available` slot under a known id.
    pub fn create(&self, id: SlotId, slot: NewSlot) -> BookingResult<SlotId> {
        if self.slots.contains_key(&id) {
            return Err(BookingError::InvalidInput(format!(
                "Timeslot id {id} is already registered"
            )));
        }
        self.begin_create(slot)?.finish(id);
        Ok(id)
    }

    /// Claims the `(assistant, time)` key of a new slot. The slot becomes
    /// visible once [`PendingSlot::finish`] is called with its id.
    pub fn begin_create(&self, slot: NewSlot) -> BookingResult<PendingSlot<'_>> {
        match self.keys.entry(slot.key()) {
            Entry::Occupied(_) => Err(BookingError::DuplicateSlot {
                assistant_id: slot.assistant_id,
                time: slot.time,
            }),
            Entry::Vacant(entry) => {
                entry.insert(None);
                Ok(PendingSlot::new(self, slot))
            }
        }
    }

    /// Current view of one slot.
    pub async fn get(&self, id: SlotId) -> BookingResult<SlotView> {
        Ok(self.lock(id).await?.view())
    }

    /// Open slots ordered by time. Held and booked slots are excluded.
    pub async fn list_available(&self) -> Vec<SlotView> {
        self.collect(|record| record.status() == SlotStatus::Available)
            .await
    }

    /// Every slot in any state, ordered by time.
    pub async fn snapshot(&self) -> Vec<SlotView> {
        self.collect(|_| true).await
    }

    /// Takes a slot out of the registry. Held slots and bookings still
    /// being written are refused.
    ///
    /// The slot's key stays claimed until the returned [`RemovedSlot`] is
    /// confirmed, so no new slot can take it while the removal may still
    /// be undone.
    pub async fn remove(&self, id: SlotId) -> BookingResult<RemovedSlot<'_>> {
        let mut record = self.lock(id).await?;
        if let SlotState::Held(_) = record.state {
            return Err(BookingError::HeldCannotRemove(id));
        }
        if record.write_pending {
            return Err(BookingError::BookingInFlight(id));
        }

        record.retired = true;
        let view = record.view();
        drop(record);

        self.slots.remove(&id);
        info!(slot_id = %id, assistant_id = %view.assistant_id, "Slot removed from registry");
        Ok(RemovedSlot::new(self, view))
    }

    /// Loads persisted rows at startup and returns how many were accepted.
    pub fn hydrate(&self, rows: Vec<SlotRow>) -> usize {
        let mut loaded = 0;
        for row in rows {
            let id = row.timeslot_id;
            let Some(record) = SlotRecord::from_row(row) else {
                warn!(slot_id = %id, "Skipping booked row without a booking name");
                continue;
            };
            if self.slots.contains_key(&id) {
                warn!(slot_id = %id, "Skipping row with an already loaded id");
                continue;
            }
            match self.keys.entry(record.key()) {
                Entry::Occupied(_) => {
                    warn!(slot_id = %id, "Skipping row with a duplicate assistant and time");
                    continue;
                }
                Entry::Vacant(entry) => {
                    entry.insert(Some(id));
                }
            }
            self.insert(record);
            loaded += 1;
        }
        debug!(loaded, "Registry hydrated");
        loaded
    }

    /// Number of registered slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slots are registered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether a slot with this id is registered.
    pub fn contains(&self, id: SlotId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Acquires a slot's lock. Removed slots report `NotFound` even to
    /// callers that were already waiting on the lock.
    pub(crate) async fn lock(&self, id: SlotId) -> BookingResult<OwnedMutexGuard<SlotRecord>> {
        let cell = self
            .slots
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(BookingError::NotFound(id))?;

        let record = cell.lock_owned().await;
        if record.retired {
            return Err(BookingError::NotFound(id));
        }
        Ok(record)
    }

    /// Handles to every slot record, for whole-registry sweeps.
    pub(crate) fn cells(&self) -> Vec<SlotCell> {
        self.slots
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    fn insert(&self, record: SlotRecord) {
        let id = record.id;
        match self.slots.entry(id) {
            Entry::Occupied(_) => invariant_violation(id, "slot id registered twice"),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(record)));
            }
        }
    }

    fn release_claim(&self, key: &SlotKey) {
        self.keys.remove_if(key, |_, id| id.is_none());
    }

    fn complete_claim(&self, key: SlotKey, id: SlotId) {
        self.keys.insert(key, Some(id));
    }

    fn release_key(&self, key: &SlotKey, id: SlotId) {
        self.keys.remove_if(key, |_, owner| *owner == Some(id));
    }

    async fn collect<F>(&self, filter: F) -> Vec<SlotView>
    where
        F: Fn(&SlotRecord) -> bool,
    {
        let mut views = Vec::new();
        for cell in self.cells() {
            let record = cell.lock().await;
            if !record.retired && filter(&*record) {
                views.push(record.view());
            }
        }
        views.sort_by(|a, b| a.time.cmp(&b.time).then(a.id.cmp(&b.id)));
        views
    }
}
