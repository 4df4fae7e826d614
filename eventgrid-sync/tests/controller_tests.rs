//! Controller behavior against the in-memory transport.

use eventgrid_core::{ErrorKind, NewEvent};
use eventgrid_storage::CacheStatus;
use eventgrid_sync::{SyncController, WriteStatus};
use eventgrid_test_utils::{assertions, fixtures, generators, MockTransport};
use futures_util::poll;
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

fn controller(transport: &MockTransport) -> SyncController<MockTransport> {
    SyncController::new(transport.clone())
}

#[tokio::test]
async fn concurrent_loads_share_one_fetch() {
    let transport = MockTransport::new(fixtures::festival_events());
    transport.hold_fetches();
    let controller = controller(&transport);

    let mut first = Box::pin(controller.ensure_loaded());
    assert!(poll!(first.as_mut()).is_pending());
    assert!(controller.snapshot().is_loading());

    let mut second = Box::pin(controller.ensure_loaded());
    assert!(poll!(second.as_mut()).is_pending());
    let mut third = Box::pin(controller.refetch());
    assert!(poll!(third.as_mut()).is_pending());
    assert_eq!(transport.fetch_calls(), 1);

    transport.release_fetches(1);
    let (a, b, c) = tokio::join!(first, second, third);
    assertions::assert_ready(&a);
    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(transport.fetch_calls(), 1);
}

#[tokio::test]
async fn invalidate_during_fetch_discards_its_result() {
    let transport = MockTransport::new(fixtures::festival_events());
    transport.hold_fetches();
    let controller = controller(&transport);

    let mut stale = Box::pin(controller.ensure_loaded());
    assert!(poll!(stale.as_mut()).is_pending());
    let version_at_start = controller.snapshot().version();

    controller.invalidate();
    let after_invalidate = controller.snapshot();
    assert!(after_invalidate.is_idle());

    transport.release_fetches(1);
    let settled = stale.await;
    assert!(settled.is_idle());
    assert!(settled.value().is_empty());
    assert!(settled.version().is_newer_than(&version_at_start));
    assert_eq!(settled.version(), after_invalidate.version());

    transport.release_fetches(1);
    let fresh = controller.ensure_loaded().await;
    assertions::assert_ready(&fresh);
    assert_eq!(transport.fetch_calls(), 2);
}

#[tokio::test]
async fn write_landing_during_fetch_forces_refetch() {
    let transport = MockTransport::new(fixtures::festival_events());
    transport.hold_fetches();
    let controller = controller(&transport);

    let mut stale = Box::pin(controller.ensure_loaded());
    assert!(poll!(stale.as_mut()).is_pending());

    controller.submit_event(fixtures::spring_fling()).await.unwrap();
    transport.release_fetches(1);
    let settled = stale.await;
    assert!(settled.is_idle(), "stale two-event result must not be applied");

    transport.release_fetches(1);
    let fresh = controller.ensure_loaded().await;
    assertions::assert_titles(fresh.value(), &["Fall Fest", "Winter Market", "Spring Fling"]);
}

#[tokio::test]
async fn second_write_while_sending_is_busy() {
    let transport = MockTransport::new(fixtures::festival_events());
    transport.hold_submits();
    let controller = controller(&transport);

    let mut first = Box::pin(controller.submit_event(fixtures::spring_fling()));
    assert!(poll!(first.as_mut()).is_pending());

    let before = controller.pending_write().unwrap();
    assert_eq!(before.status, WriteStatus::Sending);

    let err = controller
        .submit_event(NewEvent::new("Summer Jam"))
        .await
        .unwrap_err();
    assert_eq!(err, ErrorKind::Busy);
    assert_eq!(controller.pending_write(), Some(before));
    assert_eq!(transport.submit_calls(), 1);

    transport.release_submits(1);
    let created = first.await.unwrap();
    assert_eq!(created.title, "Spring Fling");
    assert!(controller.pending_write().is_none());

    // The slot is free again.
    transport.release_submits(1);
    controller.submit_event(NewEvent::new("Summer Jam")).await.unwrap();
    assert_eq!(transport.events().len(), 4);
}

#[tokio::test]
async fn failed_write_can_be_replaced_by_next_submit() {
    let transport = MockTransport::new(fixtures::festival_events());
    transport.fail_next_submit(ErrorKind::server(503, "maintenance"));
    let controller = controller(&transport);
    controller.ensure_loaded().await;

    let err = controller.submit_event(fixtures::spring_fling()).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert!(controller.snapshot().is_ready());
    assert_eq!(controller.pending_write().unwrap().status, WriteStatus::Failed);

    controller.submit_event(fixtures::spring_fling()).await.unwrap();
    assert!(controller.pending_write().is_none());
    assert!(controller.snapshot().is_idle());
}

#[tokio::test]
async fn listener_sees_full_write_cycle() {
    let transport = MockTransport::new(fixtures::festival_events());
    let controller = controller(&transport);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    controller.subscribe(move |entry| sink.lock().unwrap().push((entry.status(), entry.value().len())));

    controller.ensure_loaded().await;
    controller.submit_event(fixtures::spring_fling()).await.unwrap();
    controller.ensure_loaded().await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (CacheStatus::Loading, 0),
            (CacheStatus::Ready, 2),
            (CacheStatus::Idle, 2),
            (CacheStatus::Loading, 2),
            (CacheStatus::Ready, 3),
        ]
    );
}

#[tokio::test]
async fn refetch_after_error_keeps_previous_value_until_success() {
    let transport = MockTransport::new(fixtures::festival_events());
    let controller = controller(&transport);
    controller.ensure_loaded().await;

    transport.fail_next_fetch(ErrorKind::network("connection reset"));
    let failed = controller.refetch().await;
    assertions::assert_failed_with(&failed, &ErrorKind::network("connection reset"));
    assert_eq!(failed.value().len(), 2);

    let recovered = controller.refetch().await;
    assertions::assert_ready(&recovered);
    assert!(recovered.version().is_newer_than(&failed.version()));
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_first_load_failure_is_sticky(error in generators::arb_transport_error(), retries in 1usize..5) {
        let transport = MockTransport::new(fixtures::festival_events());
        transport.fail_next_fetch(error.clone());
        let controller = controller(&transport);

        let entries = block_on(async {
            let mut entries = Vec::new();
            for _ in 0..=retries {
                entries.push(controller.ensure_loaded().await);
            }
            entries
        });

        for entry in &entries {
            prop_assert_eq!(entry.status(), CacheStatus::Error);
            prop_assert_eq!(entry.error(), Some(&error));
            prop_assert!(entry.value().is_empty());
        }
        prop_assert_eq!(transport.fetch_calls(), 1);
        prop_assert!(controller.view("").is_empty());
    }

    #[test]
    fn prop_each_write_triggers_exactly_one_refetch(writes in prop::collection::vec(generators::arb_new_event(), 1..6)) {
        let transport = MockTransport::new(fixtures::festival_events());
        let controller = controller(&transport);

        let (count, fetches) = block_on(async {
            controller.ensure_loaded().await;
            for write in &writes {
                controller.submit_event(write.clone()).await.unwrap();
                controller.ensure_loaded().await;
                controller.ensure_loaded().await;
            }
            (controller.snapshot().value().len(), transport.fetch_calls())
        });

        prop_assert_eq!(count, 2 + writes.len());
        prop_assert_eq!(fetches, 1 + writes.len());
    }
}
