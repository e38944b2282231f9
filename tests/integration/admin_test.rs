//! Integration tests for assistant slot management.

mod helpers;

use slothub_core::error::BookingError;
use slothub_core::types::SlotId;

use helpers::{TestApp, open_row};

#[tokio::test]
async fn test_created_slot_is_reservable() {
    let mut app = TestApp::with_rows(vec![]).await;

    let view = app
        .context
        .admin()
        .create_slot("Mara", "09:30")
        .await
        .unwrap();
    app.context.reserve(view.id).await.unwrap();

    let names: Vec<&str> = app.events().iter().map(|e| e.event_name()).collect();
    assert_eq!(names, vec!["created", "reserved"]);
}

#[tokio::test]
async fn test_delete_only_by_owner() {
    let mut app = TestApp::with_rows(vec![open_row(5, "10:00")]).await;

    let err = app
        .context
        .admin()
        .delete_slot(SlotId(5), "Mara")
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotFound(SlotId(5))));

    app.context
        .admin()
        .delete_slot(SlotId(5), "Jacob1")
        .await
        .unwrap();
    assert!(app.store.row(SlotId(5)).await.is_none());
    assert!(app.context.snapshot().await.is_empty());
    assert_eq!(app.events().len(), 1);
}
