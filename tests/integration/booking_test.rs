//! Integration tests for the reserve, commit, and expiry flow.

mod helpers;

use std::time::Duration;

use slothub_core::error::BookingError;
use slothub_core::events::{ReleaseReason, SlotEvent};
use slothub_core::types::SlotId;
use slothub_entity::slot::SlotStatus;

use helpers::{TestApp, settle};

#[tokio::test(start_paused = true)]
async fn test_reserve_and_commit_within_ttl() {
    let mut app = TestApp::new().await;

    let grant = app.context.reserve(SlotId(1)).await.unwrap();
    assert_eq!(app.context.list_available().await.len(), 1);

    tokio::time::advance(Duration::from_secs(5)).await;
    app.context
        .commit(SlotId(1), grant.token, "Alice")
        .await
        .unwrap();

    // The old timer deadline passes without effect.
    tokio::time::advance(Duration::from_secs(10)).await;
    settle().await;

    assert_eq!(
        app.events(),
        vec![
            SlotEvent::Reserved { slot_id: SlotId(1) },
            SlotEvent::Booked {
                slot_id: SlotId(1),
                student_name: "Alice".into(),
            },
        ]
    );
    assert_eq!(app.persisted_booking(1).await.as_deref(), Some("Alice"));
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_reservation_reopens() {
    let mut app = TestApp::new().await;

    let grant = app.context.reserve(SlotId(1)).await.unwrap();
    tokio::time::advance(Duration::from_secs(10)).await;
    settle().await;

    assert_eq!(app.context.list_available().await.len(), 2);
    assert_eq!(
        app.events(),
        vec![
            SlotEvent::Reserved { slot_id: SlotId(1) },
            SlotEvent::Released {
                slot_id: SlotId(1),
                reason: ReleaseReason::Expired,
            },
        ]
    );

    let err = app
        .context
        .commit(SlotId(1), grant.token, "Alice")
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::StaleLease(SlotId(1))));
    assert_eq!(app.persisted_booking(1).await, None);

    tokio::time::advance(Duration::from_secs(1)).await;
    let again = app.context.reserve(SlotId(1)).await.unwrap();
    assert_ne!(again.token, grant.token);
}

#[tokio::test(start_paused = true)]
async fn test_competing_reservation_rejected() {
    let mut app = TestApp::new().await;

    app.context.reserve(SlotId(2)).await.unwrap();
    let err = app.context.reserve(SlotId(2)).await.unwrap_err();

    assert!(matches!(err, BookingError::AlreadyHeld(SlotId(2))));
    assert_eq!(app.events().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_release_then_new_holder() {
    let mut app = TestApp::new().await;

    let first = app.context.reserve(SlotId(1)).await.unwrap();
    tokio::time::advance(Duration::from_secs(7)).await;
    assert!(app.context.release(SlotId(1), first.token).await.unwrap());
    assert!(!app.context.release(SlotId(1), first.token).await.unwrap());

    let second = app.context.reserve(SlotId(1)).await.unwrap();
    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;

    let view = app.context.registry().get(SlotId(1)).await.unwrap();
    assert_eq!(view.status, SlotStatus::Held);

    app.context
        .commit(SlotId(1), second.token, "Bob")
        .await
        .unwrap();
    let names: Vec<&str> = app.events().iter().map(SlotEvent::event_name).collect();
    assert_eq!(names, vec!["reserved", "released", "reserved", "booked"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_reservations_one_winner() {
    let app = TestApp::new().await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let context = app.context.clone();
        handles.push(tokio::spawn(async move { context.reserve(SlotId(1)).await }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}
