//! Full read/write/read flows, over HTTP and in memory.

use eventgrid_core::{ErrorKind, EventId};
use eventgrid_storage::CacheStatus;
use eventgrid_sync::{RestTransport, SyncController};
use eventgrid_test_utils::{assertions, fixtures, MockTransport};
use std::time::Duration;

fn rest_controller(server: &mockito::ServerGuard) -> SyncController<RestTransport> {
    let transport = RestTransport::new(&server.url(), Duration::from_secs(5)).unwrap();
    SyncController::new(transport)
}

#[tokio::test]
async fn happy_path_over_http() {
    let mut server = mockito::Server::new_async().await;
    let initial = server
        .mock("GET", "/data")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(fixtures::envelope_json(&fixtures::festival_events()))
        .expect(1)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/events")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({"title": "Spring Fling"})))
        .with_status(201)
        .with_body(r#"{"id":3,"title":"Spring Fling","location":"Botanical Garden"}"#)
        .expect(1)
        .create_async()
        .await;

    let controller = rest_controller(&server);
    let loaded = controller.ensure_loaded().await;
    assertions::assert_ready(&loaded);
    assertions::assert_titles(loaded.value(), &["Fall Fest", "Winter Market"]);
    assertions::assert_titles(&controller.view("market"), &["Winter Market"]);

    // Mounting again while Ready does not hit the network.
    controller.ensure_loaded().await;
    initial.assert_async().await;

    let created = controller.submit_event(fixtures::spring_fling()).await.unwrap();
    assert_eq!(created.id, EventId::Int(3));
    create.assert_async().await;
    assert_eq!(controller.snapshot().status(), CacheStatus::Idle);

    initial.remove_async().await;
    let mut events = fixtures::festival_events();
    events.push(created);
    let refreshed = server
        .mock("GET", "/data")
        .with_status(200)
        .with_body(fixtures::envelope_json(&events))
        .expect(1)
        .create_async()
        .await;

    let reloaded = controller.ensure_loaded().await;
    refreshed.assert_async().await;
    assertions::assert_titles(reloaded.value(), &["Fall Fest", "Winter Market", "Spring Fling"]);
    assertions::assert_titles(&controller.view("SPRING"), &["Spring Fling"]);
    assertions::assert_titles(&controller.view("garden"), &["Spring Fling"]);
}

#[tokio::test]
async fn server_failure_over_http() {
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("GET", "/data")
        .with_status(500)
        .with_body("db down")
        .expect(1)
        .create_async()
        .await;

    let controller = rest_controller(&server);
    let entry = controller.ensure_loaded().await;
    assertions::assert_failed_with(&entry, &ErrorKind::server(500, "db down"));
    assert!(controller.view("").is_empty());

    let message = entry.error().map(ErrorKind::user_message).unwrap();
    assert!(message.starts_with("Error loading events:"));
    assert!(message.contains("db down"));

    // Sticky: no automatic retry.
    controller.ensure_loaded().await;
    failing.assert_async().await;
}

#[tokio::test]
async fn rejected_write_over_http_keeps_cache_ready() {
    let mut server = mockito::Server::new_async().await;
    let reads = server
        .mock("GET", "/data")
        .with_status(200)
        .with_body(fixtures::envelope_json(&fixtures::festival_events()))
        .expect(1)
        .create_async()
        .await;
    server
        .mock("POST", "/events")
        .with_status(400)
        .with_body("date is required")
        .create_async()
        .await;

    let controller = rest_controller(&server);
    let before = controller.ensure_loaded().await;

    let err = controller
        .submit_event(eventgrid_core::NewEvent::new("No Date"))
        .await
        .unwrap_err();
    assert_eq!(err, ErrorKind::validation("date is required"));
    assert_eq!(controller.snapshot(), before);
    assert!(controller.pending_write().unwrap().is_failed());
    reads.assert_async().await;
}

#[tokio::test]
async fn happy_path_in_memory() {
    let transport = MockTransport::new(fixtures::festival_events());
    let controller = SyncController::new(transport.clone());

    let loaded = controller.ensure_loaded().await;
    assertions::assert_titles(loaded.value(), &["Fall Fest", "Winter Market"]);

    controller.submit_event(fixtures::spring_fling()).await.unwrap();
    assert!(controller.snapshot().is_idle());

    let reloaded = controller.ensure_loaded().await;
    assertions::assert_titles(reloaded.value(), &["Fall Fest", "Winter Market", "Spring Fling"]);
    assert_eq!(transport.fetch_calls(), 2);
    assert_eq!(transport.submit_calls(), 1);
}

#[tokio::test]
async fn server_failure_in_memory() {
    let transport = MockTransport::new(fixtures::festival_events());
    transport.fail_next_fetch(ErrorKind::server(500, "db down"));
    let controller = SyncController::new(transport.clone());

    let entry = controller.ensure_loaded().await;
    assertions::assert_failed_with(&entry, &ErrorKind::server(500, "db down"));
    assert!(controller.view("fest").is_empty());

    let retried = controller.refetch().await;
    assertions::assert_ready(&retried);
    assert_eq!(controller.view("fest").len(), 1);
}
