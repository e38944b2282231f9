//! Two-phase slot creation.

use tracing::debug;

use slothub_core::types::SlotId;
use slothub_entity::slot::{NewSlot, SlotView};

use super::SlotRegistry;
use super::record::SlotRecord;

/// A claimed `(assistant, time)` key whose slot has no id yet.
///
/// Dropping it without calling [`finish`](Self::finish) releases the
/// claim, so a failed durable insert leaves the registry untouched.
#[derive(Debug)]
#[must_use = "an unfinished pending slot releases its claim when dropped"]
pub struct PendingSlot<'a> {
    registry: &'a SlotRegistry,
    slot: NewSlot,
    finished: bool,
}

impl<'a> PendingSlot<'a> {
    pub(super) fn new(registry: &'a SlotRegistry, slot: NewSlot) -> Self {
        Self {
            registry,
            slot,
            finished: false,
        }
    }

    /// The descriptor being created.
    pub fn slot(&self) -> &NewSlot {
        &self.slot
    }

    /// Registers the slot as `Available` under its assigned id.
    pub fn finish(mut self, id: SlotId) -> SlotView {
        let record = SlotRecord::available(id, &self.slot);
        let view = record.view();
        self.registry.insert(record);
        self.registry.complete_claim(self.slot.key(), id);
        self.finished = true;
        view
    }
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.registry.release_claim(&self.slot.key());
            debug!(
                assistant_id = %self.slot.assistant_id,
                time = %self.slot.time,
                "Slot claim released"
            );
        }
    }
}
