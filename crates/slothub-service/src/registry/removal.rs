//! Two-phase slot removal.

use tracing::{debug, info};

use slothub_entity::slot::{SlotKey, SlotView};

use super::SlotRegistry;
use super::record::SlotRecord;

/// A slot taken out of the registry whose `(assistant, time)` key is still
/// claimed.
///
/// The key is released by [`confirm`](Self::confirm) once the durable
/// delete succeeds. [`restore`](Self::restore), or dropping the value
/// unsettled, puts the slot back under the same id.
#[derive(Debug)]
#[must_use = "an unconfirmed removal restores the slot when dropped"]
pub struct RemovedSlot<'a> {
    registry: &'a SlotRegistry,
    view: SlotView,
    settled: bool,
}

impl<'a> RemovedSlot<'a> {
    pub(super) fn new(registry: &'a SlotRegistry, view: SlotView) -> Self {
        Self {
            registry,
            view,
            settled: false,
        }
    }

    /// The slot as it was when removed.
    pub fn view(&self) -> &SlotView {
        &self.view
    }

    /// Finalizes the removal and frees the key for new slots.
    pub fn confirm(mut self) -> SlotView {
        self.settled = true;
        self.registry.release_key(&self.key(), self.view.id);
        debug!(slot_id = %self.view.id, "Slot removal confirmed");
        self.view.clone()
    }

    /// Puts the slot back. Holds are not carried over.
    pub fn restore(mut self) -> SlotView {
        self.reinsert();
        self.view.clone()
    }

    fn key(&self) -> SlotKey {
        SlotKey {
            assistant_id: self.view.assistant_id.clone(),
            time: self.view.time.clone(),
        }
    }

    fn reinsert(&mut self) {
        self.settled = true;
        self.registry.insert(SlotRecord::from_view(self.view.clone()));
        info!(slot_id = %self.view.id, "Slot restored to registry");
    }
}

impl Drop for RemovedSlot<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.reinsert();
        }
    }
}
