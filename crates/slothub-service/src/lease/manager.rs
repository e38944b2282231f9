//! Lease grant, release, and expiry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;
use tracing::{debug, info};

use slothub_core::config::LeaseConfig;
use slothub_core::error::BookingError;
use slothub_core::events::{ReleaseReason, SlotEvent};
use slothub_core::result::BookingResult;
use slothub_core::traits::EventSink;
use slothub_core::types::{LeaseGrant, LeaseToken, SlotId};

use super::Lease;
use super::timer::LeaseTimer;
use crate::registry::{SlotRecord, SlotRegistry, SlotState};

/// Grants and ends time-bounded holds.
///
/// Every transition happens under the slot's lock; the matching event is
/// published after the lock is dropped.
#[derive(Debug, Clone)]
pub struct LeaseManager {
    /// Shared slot registry.
    registry: Arc<SlotRegistry>,
    /// Receives lifecycle events.
    sink: Arc<dyn EventSink>,
    /// Hold duration.
    ttl: Duration,
}

impl LeaseManager {
    /// Creates a new lease manager.
    pub fn new(
        registry: Arc<SlotRegistry>,
        sink: Arc<dyn EventSink>,
        config: &LeaseConfig,
    ) -> Self {
        Self {
            registry,
            sink,
            ttl: config.ttl(),
        }
    }

    /// Configured hold duration.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Places an anonymous hold on an open slot.
    pub async fn reserve(&self, slot_id: SlotId) -> BookingResult<LeaseGrant> {
        self.reserve_as(slot_id, None).await
    }

    /// Places a hold on an open slot, recording who holds it.
    pub async fn reserve_as(
        &self,
        slot_id: SlotId,
        holder: Option<String>,
    ) -> BookingResult<LeaseGrant> {
        let mut record = self.registry.lock(slot_id).await?;
        match record.state {
            SlotState::Available => {}
            SlotState::Held(_) => return Err(BookingError::AlreadyHeld(slot_id)),
            SlotState::Booked { .. } => return Err(BookingError::AlreadyBooked(slot_id)),
        }

        let holder = holder
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let grant = self.grant(&mut record, holder);
        drop(record);

        info!(
            slot_id = %slot_id,
            expires_at = %grant.expires_at,
            "Slot reserved"
        );
        self.sink.publish(SlotEvent::Reserved { slot_id });
        Ok(grant)
    }

    /// Ends a hold early.
    ///
    /// Returns `false` when the slot is already open. A token that does not
    /// match the live lease is rejected.
    pub async fn release(&self, slot_id: SlotId, token: LeaseToken) -> BookingResult<bool> {
        let mut record = self.registry.lock(slot_id).await?;
        match &record.state {
            SlotState::Available => {
                debug!(slot_id = %slot_id, "Release of an open slot ignored");
                return Ok(false);
            }
            SlotState::Held(lease) if lease.token == token => {}
            _ => return Err(BookingError::StaleLease(slot_id)),
        }

        let lease = record.take_lease();
        lease.timer.cancel();
        drop(record);

        info!(
            slot_id = %slot_id,
            held_ms = (Utc::now() - lease.granted_at).num_milliseconds(),
            "Slot released"
        );
        self.sink.publish(SlotEvent::Released {
            slot_id,
            reason: ReleaseReason::Cancelled,
        });
        Ok(true)
    }

    /// Number of holds whose expiry timer is still pending.
    pub async fn active_leases(&self) -> usize {
        let mut active = 0;
        for cell in self.registry.cells() {
            let record = cell.lock().await;
            if let SlotState::Held(lease) = &record.state {
                if !record.retired && !lease.timer.is_finished() {
                    active += 1;
                }
            }
        }
        active
    }

    /// Cancels every pending expiry timer. Holds stay in place and no
    /// events are published.
    pub async fn shutdown(&self) {
        let mut cancelled = 0;
        for cell in self.registry.cells() {
            let record = cell.lock().await;
            if let SlotState::Held(lease) = &record.state {
                lease.timer.cancel();
                cancelled += 1;
            }
        }
        info!(cancelled, "Lease timers cancelled");
    }

    /// Puts a fresh lease on `record` and arms its expiry timer. The caller
    /// holds the slot lock and has checked the transition is allowed.
    pub(crate) fn grant(&self, record: &mut SlotRecord, holder: Option<String>) -> LeaseGrant {
        let slot_id = record.id;
        let token = LeaseToken::mint();
        let granted_at = Utc::now();
        let expires_at = wall_clock_after(granted_at, self.ttl);

        let manager = self.clone();
        let timer = LeaseTimer::spawn(deadline_after(self.ttl), async move {
            manager.expire(slot_id, token).await;
        });

        record.hold(Lease {
            token,
            holder,
            granted_at,
            expires_at,
            timer,
        });

        LeaseGrant {
            slot_id,
            token,
            expires_at,
        }
    }

    /// Expiry path. Runs on the lease's own timer task, so it must not
    /// cancel that timer.
    async fn expire(&self, slot_id: SlotId, token: LeaseToken) {
        let Ok(mut record) = self.registry.lock(slot_id).await else {
            debug!(slot_id = %slot_id, "Expiry for a removed slot ignored");
            return;
        };
        match &record.state {
            SlotState::Held(lease) if lease.token == token => {}
            _ => {
                debug!(slot_id = %slot_id, "Stale lease timer ignored");
                return;
            }
        }

        let lease = record.take_lease();
        drop(record);

        info!(
            slot_id = %slot_id,
            granted_at = %lease.granted_at,
            "Slot lease expired"
        );
        self.sink.publish(SlotEvent::Released {
            slot_id,
            reason: ReleaseReason::Expired,
        });
    }
}

fn deadline_after(ttl: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(ttl)
        .unwrap_or_else(|| now + Duration::from_secs(86_400 * 365))
}

fn wall_clock_after(from: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| from.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
