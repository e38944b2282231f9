//! Converts a held slot into a durable booking.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::timeout;
use tracing::{info, warn};

use slothub_core::config::LeaseConfig;
use slothub_core::error::{AppError, BookingError};
use slothub_core::events::SlotEvent;
use slothub_core::result::{AppResult, BookingResult};
use slothub_core::traits::EventSink;
use slothub_core::types::{LeaseGrant, LeaseToken, SlotId};
use slothub_database::SlotStore;

use crate::lease::LeaseManager;
use crate::registry::{SlotRegistry, SlotState, invariant_violation};

/// A confirmed booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookedSlot {
    /// The booked slot.
    pub slot_id: SlotId,
    /// Owning assistant.
    pub assistant_id: String,
    /// Slot time label.
    pub time: String,
    /// Name the booking was made under.
    pub student_name: String,
    /// When the booking was persisted.
    pub booked_at: DateTime<Utc>,
}

/// Commits holds into bookings.
///
/// The slot moves to `Booked` in memory first, then the booking is
/// written with the slot lock released. The record stays marked as
/// pending until the write settles, and the registry refuses to remove
/// it meanwhile. A failed or timed-out write puts the slot back on hold
/// under a fresh lease.
#[derive(Debug, Clone)]
pub struct BookingCommitter {
    /// Shared slot registry.
    registry: Arc<SlotRegistry>,
    /// Lease manager, used to re-arm a hold on rollback.
    leases: LeaseManager,
    /// Persistence gateway.
    store: Arc<dyn SlotStore>,
    /// Receives lifecycle events.
    sink: Arc<dyn EventSink>,
    /// Upper bound on the durable write.
    persist_timeout: Duration,
}

impl BookingCommitter {
    /// Creates a new booking committer.
    pub fn new(
        registry: Arc<SlotRegistry>,
        leases: LeaseManager,
        store: Arc<dyn SlotStore>,
        sink: Arc<dyn EventSink>,
        config: &LeaseConfig,
    ) -> Self {
        Self {
            registry,
            leases,
            store,
            sink,
            persist_timeout: config.persist_timeout(),
        }
    }

    /// Books a held slot for `student_name`. `token` must match the live
    /// lease.
    ///
    /// On [`BookingError::PersistenceFailure`] the slot is held again and
    /// the error carries the replacement lease.
    pub async fn commit(
        &self,
        slot_id: SlotId,
        token: LeaseToken,
        student_name: &str,
    ) -> BookingResult<BookedSlot> {
        let student_name = student_name.trim();
        if student_name.is_empty() {
            return Err(BookingError::InvalidInput(
                "Student name is required".to_string(),
            ));
        }

        let mut record = self.registry.lock(slot_id).await?;
        match &record.state {
            SlotState::Held(lease) if lease.token == token => {}
            SlotState::Booked { .. } => return Err(BookingError::AlreadyBooked(slot_id)),
            _ => return Err(BookingError::StaleLease(slot_id)),
        }

        let lease = record.book(student_name.to_string());
        lease.timer.cancel();
        let assistant_id = record.assistant_id.clone();
        let time = record.time.clone();
        drop(record);

        if let Err(source) = self.persist(slot_id, student_name).await {
            let retry = self.roll_back(slot_id, student_name, lease.holder).await;
            warn!(
                slot_id = %slot_id,
                error = %source,
                expires_at = %retry.expires_at,
                "Booking write failed, slot held again"
            );
            return Err(BookingError::PersistenceFailure {
                slot_id: Some(slot_id),
                retry: Some(retry),
                source,
            });
        }

        match self.registry.lock(slot_id).await {
            Ok(mut record) => record.confirm_write(),
            Err(_) => invariant_violation(
                slot_id,
                "slot removed while its booking was being written",
            ),
        }

        info!(slot_id = %slot_id, student_name, "Slot booked");
        self.sink.publish(SlotEvent::Booked {
            slot_id,
            student_name: student_name.to_string(),
        });

        Ok(BookedSlot {
            slot_id,
            assistant_id,
            time,
            student_name: student_name.to_string(),
            booked_at: Utc::now(),
        })
    }

    async fn persist(&self, slot_id: SlotId, student_name: &str) -> AppResult<()> {
        match timeout(
            self.persist_timeout,
            self.store.upsert_booking(slot_id, student_name),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::timeout(format!(
                "Booking write for timeslot {slot_id} timed out after {:?}",
                self.persist_timeout
            ))),
        }
    }

    /// Returns an optimistically booked slot to `Held` under a new lease.
    async fn roll_back(
        &self,
        slot_id: SlotId,
        student_name: &str,
        holder: Option<String>,
    ) -> LeaseGrant {
        let Ok(mut record) = self.registry.lock(slot_id).await else {
            invariant_violation(slot_id, "slot removed while its booking was being written")
        };

        record.undo_booking(student_name);
        self.leases.grant(&mut record, holder)
    }
}
