//! Wiring of the slot lifecycle services.

use std::sync::Arc;

use tracing::info;

use slothub_core::config::AppConfig;
use slothub_core::result::{AppResult, BookingResult};
use slothub_core::traits::EventSink;
use slothub_core::types::{LeaseGrant, LeaseToken, SlotId};
use slothub_database::SlotStore;
use slothub_entity::slot::SlotView;
use slothub_realtime::{EventBroadcaster, EventEnvelope, SubscriberId, Subscription};

use crate::admin::SlotAdminService;
use crate::booking::{BookedSlot, BookingCommitter};
use crate::lease::LeaseManager;
use crate::registry::SlotRegistry;

/// One booking core: a hydrated registry plus the services acting on it.
#[derive(Debug, Clone)]
pub struct BookingContext {
    registry: Arc<SlotRegistry>,
    leases: LeaseManager,
    committer: BookingCommitter,
    admin: SlotAdminService,
    broadcaster: Arc<EventBroadcaster>,
    store: Arc<dyn SlotStore>,
}

impl BookingContext {
    /// Loads every persisted slot and wires the services around it.
    pub async fn init(
        config: &AppConfig,
        store: Arc<dyn SlotStore>,
        broadcaster: Arc<EventBroadcaster>,
    ) -> AppResult<Self> {
        let rows = store.load_all_slots().await?;
        let total = rows.len();

        let registry = Arc::new(SlotRegistry::new());
        let loaded = registry.hydrate(rows);

        let sink: Arc<dyn EventSink> = broadcaster.clone();
        let leases = LeaseManager::new(Arc::clone(&registry), Arc::clone(&sink), &config.lease);
        let committer = BookingCommitter::new(
            Arc::clone(&registry),
            leases.clone(),
            Arc::clone(&store),
            Arc::clone(&sink),
            &config.lease,
        );
        let admin = SlotAdminService::new(Arc::clone(&registry), Arc::clone(&store), sink);

        info!(
            rows = total,
            loaded,
            ttl_seconds = config.lease.ttl_seconds,
            "Booking context initialized"
        );

        Ok(Self {
            registry,
            leases,
            committer,
            admin,
            broadcaster,
            store,
        })
    }

    /// The slot registry.
    pub fn registry(&self) -> &Arc<SlotRegistry> {
        &self.registry
    }

    /// The lease manager.
    pub fn leases(&self) -> &LeaseManager {
        &self.leases
    }

    /// The booking committer.
    pub fn committer(&self) -> &BookingCommitter {
        &self.committer
    }

    /// The admin service.
    pub fn admin(&self) -> &SlotAdminService {
        &self.admin
    }

    /// The event broadcaster.
    pub fn broadcaster(&self) -> &Arc<EventBroadcaster> {
        &self.broadcaster
    }

    /// The persistence gateway.
    pub fn store(&self) -> &Arc<dyn SlotStore> {
        &self.store
    }

    /// See [`LeaseManager::reserve`].
    pub async fn reserve(&self, slot_id: SlotId) -> BookingResult<LeaseGrant> {
        self.leases.reserve(slot_id).await
    }

    /// See [`BookingCommitter::commit`].
    pub async fn commit(
        &self,
        slot_id: SlotId,
        token: LeaseToken,
        student_name: &str,
    ) -> BookingResult<BookedSlot> {
        self.committer.commit(slot_id, token, student_name).await
    }

    /// See [`LeaseManager::release`].
    pub async fn release(&self, slot_id: SlotId, token: LeaseToken) -> BookingResult<bool> {
        self.leases.release(slot_id, token).await
    }

    /// See [`SlotRegistry::list_available`].
    pub async fn list_available(&self) -> Vec<SlotView> {
        self.registry.list_available().await
    }

    /// See [`SlotRegistry::snapshot`].
    pub async fn snapshot(&self) -> Vec<SlotView> {
        self.registry.snapshot().await
    }

    /// See [`EventBroadcaster::subscribe`].
    pub fn subscribe(&self) -> Subscription {
        self.broadcaster.subscribe()
    }

    /// See [`EventBroadcaster::on_event`].
    pub fn on_event<F>(&self, handler: F) -> SubscriberId
    where
        F: Fn(EventEnvelope) + Send + Sync + 'static,
    {
        self.broadcaster.on_event(handler)
    }

    /// Stops lease timers and closes every subscription.
    pub async fn shutdown(&self) {
        self.leases.shutdown().await;
        self.broadcaster.close();
        info!("Booking context shut down");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use slothub_core::config::RealtimeConfig;
    use slothub_core::error::BookingError;
    use slothub_core::events::SlotEvent;
    use slothub_database::MemorySlotStore;
    use slothub_entity::slot::{SlotRow, SlotStatus};

    use super::*;
    use crate::testing::settle;

    fn row(id: i64, time: &str, booked_by: Option<&str>) -> SlotRow {
        SlotRow {
            timeslot_id: SlotId(id),
            assistant_id: "Jacob1".into(),
            time: time.into(),
            booked: booked_by.is_some(),
            booked_by: booked_by.map(String::from),
        }
    }

    async fn context() -> BookingContext {
        let store = Arc::new(MemorySlotStore::with_rows(vec![
            row(1, "15:00", None),
            row(2, "16:00", Some("Alice")),
            row(3, "17:00", None),
        ]));
        let config = AppConfig::default();
        let broadcaster = Arc::new(EventBroadcaster::new(&RealtimeConfig::default()));
        BookingContext::init(&config, store, broadcaster)
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_hydrates_registry() {
        let ctx = context().await;

        assert_eq!(ctx.snapshot().await.len(), 3);
        let open: Vec<SlotId> = ctx.list_available().await.iter().map(|v| v.id).collect();
        assert_eq!(open, vec![SlotId(1), SlotId(3)]);
        assert!(matches!(
            ctx.reserve(SlotId(2)).await,
            Err(BookingError::AlreadyBooked(SlotId(2)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reserve_then_commit_broadcasts() {
        let ctx = context().await;
        let mut sub = ctx.subscribe();

        let grant = ctx.reserve(SlotId(1)).await.unwrap();
        ctx.commit(SlotId(1), grant.token, "Bob").await.unwrap();

        let events: Vec<SlotEvent> = sub.drain().into_iter().map(|e| e.event).collect();
        assert_eq!(
            events,
            vec![
                SlotEvent::Reserved { slot_id: SlotId(1) },
                SlotEvent::Booked {
                    slot_id: SlotId(1),
                    student_name: "Bob".into(),
                },
            ]
        );
        let row = ctx.store().load_all_slots().await.unwrap();
        assert!(row.iter().any(|r| r.timeslot_id == SlotId(1) && r.booked));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_hold_expires() {
        let ctx = context().await;
        let mut sub = ctx.subscribe();

        ctx.reserve(SlotId(3)).await.unwrap();
        assert_eq!(ctx.list_available().await.len(), 1);

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;

        assert_eq!(ctx.list_available().await.len(), 2);
        let names: Vec<&str> = sub.drain().iter().map(|e| e.event.event_name()).collect();
        assert_eq!(names, vec!["reserved", "released"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_keeps_holds_and_closes_subscribers() {
        let ctx = context().await;
        let mut sub = ctx.subscribe();
        ctx.reserve(SlotId(1)).await.unwrap();
        assert!(sub.recv().await.is_some());

        ctx.shutdown().await;
        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;

        assert!(sub.recv().await.is_none());
        assert_eq!(
            ctx.registry().get(SlotId(1)).await.unwrap().status,
            SlotStatus::Held
        );
    }
}
