//! Slot creation and deletion.

use std::sync::Arc;

use tracing::{info, warn};

use slothub_core::error::{BookingError, ErrorKind};
use slothub_core::events::SlotEvent;
use slothub_core::result::BookingResult;
use slothub_core::traits::EventSink;
use slothub_core::types::SlotId;
use slothub_database::SlotStore;
use slothub_entity::slot::{NewSlot, SlotView};

use crate::registry::SlotRegistry;

/// Creates and removes slots on behalf of assistants.
#[derive(Debug, Clone)]
pub struct SlotAdminService {
    /// Shared slot registry.
    registry: Arc<SlotRegistry>,
    /// Persistence gateway.
    store: Arc<dyn SlotStore>,
    /// Receives lifecycle events.
    sink: Arc<dyn EventSink>,
}

impl SlotAdminService {
    /// Creates a new admin service.
    pub fn new(
        registry: Arc<SlotRegistry>,
        store: Arc<dyn SlotStore>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            registry,
            store,
            sink,
        }
    }

    /// Adds an open slot for `assistant_id` at `time`.
    pub async fn create_slot(&self, assistant_id: &str, time: &str) -> BookingResult<SlotView> {
        let slot = NewSlot::new(assistant_id, time);
        if slot.assistant_id.is_empty() {
            return Err(BookingError::InvalidInput(
                "Assistant is required".to_string(),
            ));
        }
        if slot.time.is_empty() {
            return Err(BookingError::InvalidInput("Time is required".to_string()));
        }

        let pending = self.registry.begin_create(slot)?;
        let id = match self.store.insert_slot(pending.slot()).await {
            Ok(id) => id,
            Err(source) if source.kind == ErrorKind::Conflict => {
                return Err(BookingError::DuplicateSlot {
                    assistant_id: pending.slot().assistant_id.clone(),
                    time: pending.slot().time.clone(),
                });
            }
            Err(source) => {
                warn!(error = %source, "Slot insert failed");
                return Err(BookingError::PersistenceFailure {
                    slot_id: None,
                    retry: None,
                    source,
                });
            }
        };

        let view = pending.finish(id);
        info!(
            slot_id = %id,
            assistant_id = %view.assistant_id,
            time = %view.time,
            "Slot created"
        );
        self.sink.publish(SlotEvent::Created {
            slot_id: id,
            assistant_id: view.assistant_id.clone(),
            time: view.time.clone(),
        });
        Ok(view)
    }

    /// Deletes a slot owned by `requested_by`.
    ///
    /// Slots owned by someone else are reported as not found. Held slots
    /// and bookings still being written cannot be deleted. The slot's key
    /// stays claimed until the durable delete succeeds; if it fails the
    /// slot is put back.
    pub async fn delete_slot(
        &self,
        slot_id: SlotId,
        requested_by: &str,
    ) -> BookingResult<SlotView> {
        let current = self.registry.get(slot_id).await?;
        if current.assistant_id != requested_by.trim() {
            return Err(BookingError::NotFound(slot_id));
        }

        let removed = self.registry.remove(slot_id).await?;
        if let Err(source) = self.store.delete_slot(slot_id).await {
            let restored = removed.restore();
            warn!(
                slot_id = %slot_id,
                status = ?restored.status,
                error = %source,
                "Slot delete failed, slot restored"
            );
            return Err(BookingError::PersistenceFailure {
                slot_id: Some(slot_id),
                retry: None,
                source,
            });
        }

        let removed = removed.confirm();
        info!(slot_id = %slot_id, assistant_id = %removed.assistant_id, "Slot deleted");
        self.sink.publish(SlotEvent::Deleted { slot_id });
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use slothub_core::config::LeaseConfig;
    use slothub_entity::slot::SlotStatus;

    use super::*;
    use crate::booking::BookingCommitter;
    use crate::lease::LeaseManager;
    use crate::testing::{FlakyStore, RecordingSink, settle};

    type Setup = (
        SlotAdminService,
        Arc<SlotRegistry>,
        Arc<FlakyStore>,
        Arc<RecordingSink>,
    );

    fn setup() -> Setup {
        let registry = Arc::new(SlotRegistry::new());
        let store = Arc::new(FlakyStore::default());
        let sink = Arc::new(RecordingSink::default());
        let admin = SlotAdminService::new(Arc::clone(&registry), store.clone(), sink.clone());
        (admin, registry, store, sink)
    }

    fn booking(
        registry: &Arc<SlotRegistry>,
        store: &Arc<FlakyStore>,
        sink: &Arc<RecordingSink>,
    ) -> (LeaseManager, BookingCommitter) {
        let config = LeaseConfig::default();
        let leases = LeaseManager::new(Arc::clone(registry), sink.clone(), &config);
        let committer = BookingCommitter::new(
            Arc::clone(registry),
            leases.clone(),
            store.clone(),
            sink.clone(),
            &config,
        );
        (leases, committer)
    }

    #[tokio::test]
    async fn test_create_slot_persists_and_publishes() {
        let (admin, registry, store, sink) = setup();

        let view = admin.create_slot(" Jacob1 ", "15:00").await.unwrap();
        assert_eq!(view.assistant_id, "Jacob1");
        assert_eq!(view.status, SlotStatus::Available);
        assert!(registry.contains(view.id));
        assert!(store.inner().row(view.id).await.is_some());
        assert_eq!(
            sink.events(),
            vec![SlotEvent::Created {
                slot_id: view.id,
                assistant_id: "Jacob1".into(),
                time: "15:00".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_create_slot_validates_input() {
        let (admin, _registry, _store, sink) = setup();

        assert!(matches!(
            admin.create_slot("", "15:00").await,
            Err(BookingError::InvalidInput(_))
        ));
        assert!(matches!(
            admin.create_slot("Jacob1", "  ").await,
            Err(BookingError::InvalidInput(_))
        ));
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_slot_rejected() {
        let (admin, registry, _store, _sink) = setup();
        admin.create_slot("Jacob1", "15:00").await.unwrap();

        let err = admin.create_slot("Jacob1", "15:00").await.unwrap_err();
        assert!(matches!(err, BookingError::DuplicateSlot { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_insert_releases_claim() {
        let (admin, registry, store, _sink) = setup();

        store.fail_writes(true);
        let err = admin.create_slot("Jacob1", "15:00").await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::PersistenceFailure { slot_id: None, .. }
        ));
        assert!(registry.is_empty());

        store.fail_writes(false);
        admin.create_slot("Jacob1", "15:00").await.unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let (admin, registry, _store, _sink) = setup();
        let view = admin.create_slot("Jacob1", "15:00").await.unwrap();

        let err = admin.delete_slot(view.id, "Mara").await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
        assert!(registry.contains(view.id));
    }

    #[tokio::test]
    async fn test_delete_slot_removes_everywhere() {
        let (admin, registry, store, sink) = setup();
        let view = admin.create_slot("Jacob1", "15:00").await.unwrap();

        let removed = admin.delete_slot(view.id, "Jacob1").await.unwrap();
        assert_eq!(removed.id, view.id);
        assert!(!registry.contains(view.id));
        assert!(store.inner().row(view.id).await.is_none());
        assert_eq!(sink.names(), vec!["created", "deleted"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_held_slot_rejected() {
        let (admin, registry, _store, sink) = setup();
        let view = admin.create_slot("Jacob1", "15:00").await.unwrap();
        let leases = LeaseManager::new(
            Arc::clone(&registry),
            sink.clone(),
            &LeaseConfig::default(),
        );
        leases.reserve(view.id).await.unwrap();

        let err = admin.delete_slot(view.id, "Jacob1").await.unwrap_err();
        assert!(matches!(err, BookingError::HeldCannotRemove(_)));
        assert_eq!(
            registry.get(view.id).await.unwrap().status,
            SlotStatus::Held
        );
    }

    #[tokio::test]
    async fn test_failed_delete_restores_slot() {
        let (admin, registry, store, sink) = setup();
        let view = admin.create_slot("Jacob1", "15:00").await.unwrap();

        store.fail_writes(true);
        let err = admin.delete_slot(view.id, "Jacob1").await.unwrap_err();
        assert!(matches!(err, BookingError::PersistenceFailure { .. }));

        assert_eq!(
            registry.get(view.id).await.unwrap().status,
            SlotStatus::Available
        );
        assert!(store.inner().row(view.id).await.is_some());
        assert_eq!(sink.names(), vec!["created"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_booked_slot() {
        let (admin, registry, store, sink) = setup();
        let view = admin.create_slot("Jacob1", "15:00").await.unwrap();
        let (leases, committer) = booking(&registry, &store, &sink);
        let grant = leases.reserve(view.id).await.unwrap();
        committer
            .commit(view.id, grant.token, "Alice")
            .await
            .unwrap();

        store.fail_writes(true);
        assert!(admin.delete_slot(view.id, "Jacob1").await.is_err());
        let restored = registry.get(view.id).await.unwrap();
        assert_eq!(restored.status, SlotStatus::Booked);
        assert_eq!(restored.booked_by.as_deref(), Some("Alice"));

        store.fail_writes(false);
        let removed = admin.delete_slot(view.id, "Jacob1").await.unwrap();
        assert_eq!(removed.status, SlotStatus::Booked);
        assert_eq!(removed.booked_by.as_deref(), Some("Alice"));
        assert!(!registry.contains(view.id));
        assert!(store.inner().row(view.id).await.is_none());
        assert_eq!(
            sink.names(),
            vec!["created", "reserved", "booked", "deleted"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_refused_while_booking_is_written() {
        let (admin, registry, store, sink) = setup();
        let view = admin.create_slot("Jacob1", "15:00").await.unwrap();
        let (leases, committer) = booking(&registry, &store, &sink);
        let grant = leases.reserve(view.id).await.unwrap();

        store.pause_writes();
        store.fail_writes(true);
        let commit = tokio::spawn({
            let committer = committer.clone();
            async move { committer.commit(view.id, grant.token, "Alice").await }
        });
        settle().await;
        assert_eq!(
            registry.get(view.id).await.unwrap().status,
            SlotStatus::Booked
        );

        let err = admin.delete_slot(view.id, "Jacob1").await.unwrap_err();
        assert!(matches!(err, BookingError::BookingInFlight(_)));
        assert!(registry.contains(view.id));

        store.resume_writes();
        let err = commit.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            BookingError::PersistenceFailure { retry: Some(_), .. }
        ));

        let current = registry.get(view.id).await.unwrap();
        assert_eq!(current.status, SlotStatus::Held);
        assert!(current.booked_by.is_none());
        assert!(!store.inner().row(view.id).await.unwrap().booked);
        assert_eq!(sink.names(), vec!["created", "reserved"]);
    }

    #[tokio::test]
    async fn test_key_stays_claimed_while_delete_is_written() {
        let (admin, registry, store, sink) = setup();
        let view = admin.create_slot("Jacob1", "15:00").await.unwrap();

        store.pause_writes();
        store.fail_writes(true);
        let delete = tokio::spawn({
            let admin = admin.clone();
            async move { admin.delete_slot(view.id, "Jacob1").await }
        });
        settle().await;
        assert!(!registry.contains(view.id));

        let err = admin.create_slot("Jacob1", "15:00").await.unwrap_err();
        assert!(matches!(err, BookingError::DuplicateSlot { .. }));

        store.resume_writes();
        let err = delete.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            BookingError::PersistenceFailure {
                slot_id: Some(_),
                ..
            }
        ));
        assert_eq!(
            registry.get(view.id).await.unwrap().status,
            SlotStatus::Available
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(sink.names(), vec!["created"]);
    }
}
