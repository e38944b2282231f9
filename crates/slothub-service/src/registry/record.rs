//! Per-slot record guarded by the slot's own lock.

use slothub_core::types::SlotId;
use slothub_entity::slot::{NewSlot, SlotKey, SlotRow, SlotStatus, SlotView};

use super::invariant_violation;
use crate::lease::Lease;

/// Lifecycle state of one slot.
#[derive(Debug)]
pub(crate) enum SlotState {
    /// Open for reservation.
    Available,
    /// Held under a live lease.
    Held(Lease),
    /// Durably booked.
    Booked {
        /// Name the booking was made under.
        booked_by: String,
    },
}

/// In-memory state of one slot.
#[derive(Debug)]
pub(crate) struct SlotRecord {
    pub(crate) id: SlotId,
    pub(crate) assistant_id: String,
    pub(crate) time: String,
    pub(crate) state: SlotState,
    /// Set under the lock when the slot is removed. Callers that were
    /// queued on the lock see the slot as gone.
    pub(crate) retired: bool,
    /// Set while a booking made under the lock is being written. The
    /// slot is `Booked` in memory but not yet durable.
    pub(crate) write_pending: bool,
}

impl SlotRecord {
    pub(crate) fn available(id: SlotId, slot: &NewSlot) -> Self {
        Self {
            id,
            assistant_id: slot.assistant_id.clone(),
            time: slot.time.clone(),
            state: SlotState::Available,
            retired: false,
            write_pending: false,
        }
    }

    /// Builds a record from a persisted row. A booked row without a
    /// booking name is rejected.
    pub(crate) fn from_row(row: SlotRow) -> Option<Self> {
        let state = match (row.booked, row.booked_by) {
            (false, _) => SlotState::Available,
            (true, Some(name)) if !name.trim().is_empty() => SlotState::Booked { booked_by: name },
            (true, _) => return None,
        };
        Some(Self {
            id: row.timeslot_id,
            assistant_id: row.assistant_id,
            time: row.time,
            state,
            retired: false,
            write_pending: false,
        })
    }

    /// Rebuilds a record from a view taken at removal time. Holds are not
    /// carried over.
    pub(crate) fn from_view(view: SlotView) -> Self {
        let state = match view.booked_by {
            Some(booked_by) if view.status == SlotStatus::Booked => SlotState::Booked { booked_by },
            _ => SlotState::Available,
        };
        Self {
            id: view.id,
            assistant_id: view.assistant_id,
            time: view.time,
            state,
            retired: false,
            write_pending: false,
        }
    }

    pub(crate) fn key(&self) -> SlotKey {
        SlotKey {
            assistant_id: self.assistant_id.clone(),
            time: self.time.clone(),
        }
    }

    pub(crate) fn status(&self) -> SlotStatus {
        match self.state {
            SlotState::Available => SlotStatus::Available,
            SlotState::Held(_) => SlotStatus::Held,
            SlotState::Booked { .. } => SlotStatus::Booked,
        }
    }

    pub(crate) fn view(&self) -> SlotView {
        let (held_by, booked_by, lease_expires_at) = match &self.state {
            SlotState::Available => (None, None, None),
            SlotState::Held(lease) => (lease.holder.clone(), None, Some(lease.expires_at)),
            SlotState::Booked { booked_by } => (None, Some(booked_by.clone()), None),
        };
        SlotView {
            id: self.id,
            assistant_id: self.assistant_id.clone(),
            time: self.time.clone(),
            status: self.status(),
            held_by,
            booked_by,
            lease_expires_at,
        }
    }

    /// Places a lease on the slot. A slot never carries two leases.
    pub(crate) fn hold(&mut self, lease: Lease) {
        if let SlotState::Held(current) = &self.state {
            current.timer.cancel();
            invariant_violation(self.id, "lease granted on a slot that is already held");
        }
        self.state = SlotState::Held(lease);
    }

    /// Ends the hold and reopens the slot, returning the lease.
    pub(crate) fn take_lease(&mut self) -> Lease {
        match std::mem::replace(&mut self.state, SlotState::Available) {
            SlotState::Held(lease) => lease,
            other => {
                self.state = other;
                invariant_violation(self.id, "release of a slot that is not held")
            }
        }
    }

    /// Converts the hold into a booking, returning the lease. The booking
    /// stays pending until [`confirm_write`](Self::confirm_write).
    pub(crate) fn book(&mut self, booked_by: String) -> Lease {
        match std::mem::replace(&mut self.state, SlotState::Booked { booked_by }) {
            SlotState::Held(lease) => {
                self.write_pending = true;
                lease
            }
            other => {
                self.state = other;
                invariant_violation(self.id, "booking of a slot that is not held")
            }
        }
    }

    /// Marks a pending booking as durable.
    pub(crate) fn confirm_write(&mut self) {
        self.write_pending = false;
    }

    /// Reopens a pending booking whose write failed.
    pub(crate) fn undo_booking(&mut self, booked_by: &str) {
        match &self.state {
            SlotState::Booked { booked_by: name } if self.write_pending && name == booked_by => {}
            _ => invariant_violation(
                self.id,
                "booked slot changed while its write was in flight",
            ),
        }
        self.state = SlotState::Available;
        self.write_pending = false;
    }
}
