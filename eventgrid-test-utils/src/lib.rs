//! EVENTGRID Test Utilities
//!
//! Shared test infrastructure for the EVENTGRID workspace:
//! - A scriptable in-memory transport
//! - Proptest generators for events and errors
//! - Fixtures for the common festival scenario
//! - Assertions over cache snapshots

pub use eventgrid_core::{ErrorKind, Event, EventId, NewEvent};
pub use eventgrid_storage::{CacheEntry, CacheStatus};
pub use eventgrid_sync::{EventTransport, PendingWrite, SyncController, WriteStatus};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

// ============================================================================
// MOCK TRANSPORT
// ============================================================================

#[derive(Debug, Default)]
struct MockState {
    events: Vec<Event>,
    fetch_failures: VecDeque<ErrorKind>,
    submit_failures: VecDeque<ErrorKind>,
    submitted: Vec<NewEvent>,
    fetch_calls: usize,
    submit_calls: usize,
}

#[derive(Debug, Default)]
struct MockInner {
    state: Mutex<MockState>,
    fetch_gate: Mutex<Option<Arc<Semaphore>>>,
    submit_gate: Mutex<Option<Arc<Semaphore>>>,
}

/// In-memory event service.
///
/// Clones share state, so a test can hand one clone to a controller and keep
/// another to script failures and inspect calls. Fetches and submits can be
/// held open with [`hold_fetches`](Self::hold_fetches) and
/// [`hold_submits`](Self::hold_submits) until released one by one.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<MockInner>,
}

impl MockTransport {
    pub fn new(events: Vec<Event>) -> Self {
        let transport = Self::default();
        transport.state().events = events;
        transport
    }

    /// Make the next fetch fail with `error`. Failures queue up in order.
    pub fn fail_next_fetch(&self, error: ErrorKind) {
        self.state().fetch_failures.push_back(error);
    }

    /// Make the next submit fail with `error`. Failures queue up in order.
    pub fn fail_next_submit(&self, error: ErrorKind) {
        self.state().submit_failures.push_back(error);
    }

    /// Block every fetch that starts from now on until released.
    pub fn hold_fetches(&self) {
        *lock(&self.inner.fetch_gate) = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `count` held fetches complete.
    pub fn release_fetches(&self, count: usize) {
        if let Some(gate) = lock(&self.inner.fetch_gate).as_ref() {
            gate.add_permits(count);
        }
    }

    /// Block every submit that starts from now on until released.
    pub fn hold_submits(&self) {
        *lock(&self.inner.submit_gate) = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `count` held submits complete.
    pub fn release_submits(&self, count: usize) {
        if let Some(gate) = lock(&self.inner.submit_gate).as_ref() {
            gate.add_permits(count);
        }
    }

    pub fn fetch_calls(&self) -> usize {
        self.state().fetch_calls
    }

    pub fn submit_calls(&self) -> usize {
        self.state().submit_calls
    }

    /// The collection the service currently stores.
    pub fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    /// Every payload received, in order, including rejected ones.
    pub fn submitted(&self) -> Vec<NewEvent> {
        self.state().submitted.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        lock(&self.inner.state)
    }

    async fn pass(gate: &Mutex<Option<Arc<Semaphore>>>) {
        let gate = lock(gate).clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }
}

#[async_trait]
impl EventTransport for MockTransport {
    async fn fetch_collection(&self) -> Result<Vec<Event>, ErrorKind> {
        // The response reflects the collection as of when the request began.
        let response = {
            let mut state = self.state();
            state.fetch_calls += 1;
            match state.fetch_failures.pop_front() {
                Some(error) => Err(error),
                None => Ok(state.events.clone()),
            }
        };
        Self::pass(&self.inner.fetch_gate).await;
        response
    }

    async fn submit_event(&self, payload: &NewEvent) -> Result<Event, ErrorKind> {
        {
            let mut state = self.state();
            state.submit_calls += 1;
            state.submitted.push(payload.clone());
        }
        Self::pass(&self.inner.submit_gate).await;

        let mut state = self.state();
        if let Some(error) = state.submit_failures.pop_front() {
            return Err(error);
        }
        let id = next_id(&state.events);
        let event = payload.clone().into_event(id);
        state.events.push(event.clone());
        Ok(event)
    }
}

fn next_id(events: &[Event]) -> i64 {
    events
        .iter()
        .filter_map(|event| match event.id {
            EventId::Int(id) => Some(id),
            EventId::Text(_) => None,
        })
        .max()
        .unwrap_or(0)
        + 1
}

fn lock<S>(mutex: &Mutex<S>) -> MutexGuard<'_, S> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for EVENTGRID types.

    use super::*;
    use proptest::prelude::*;

    pub fn arb_event_id() -> impl Strategy<Value = EventId> {
        prop_oneof![
            (1i64..100_000).prop_map(EventId::Int),
            "[a-z0-9]{4,12}".prop_map(EventId::Text),
        ]
    }

    /// Short titles with mixed case and spaces.
    pub fn arb_title() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z ]{0,23}"
    }

    pub fn arb_event() -> impl Strategy<Value = Event> {
        (
            arb_event_id(),
            arb_title(),
            proptest::option::of("[A-Za-z ]{0,20}"),
            proptest::option::of("[A-Za-z ]{0,40}"),
        )
            .prop_map(|(id, title, location, description)| {
                let mut event = Event::new(id, title);
                if let Some(location) = location {
                    event = event.with_attribute("location", location);
                }
                if let Some(description) = description {
                    event = event.with_attribute("description", description);
                }
                event
            })
    }

    pub fn arb_events() -> impl Strategy<Value = Vec<Event>> {
        prop::collection::vec(arb_event(), 0..20)
    }

    pub fn arb_new_event() -> impl Strategy<Value = NewEvent> {
        (arb_title(), "2026-(0[1-9]|1[0-2])-(0[1-9]|1[0-9]|2[0-8])")
            .prop_map(|(title, date)| NewEvent::new(title).with_field("date", date))
    }

    /// Any transport failure. Never [`ErrorKind::Busy`], which only the
    /// controller produces.
    pub fn arb_transport_error() -> impl Strategy<Value = ErrorKind> {
        prop_oneof![
            "[a-z ]{1,20}".prop_map(ErrorKind::network),
            (500u16..600, "[a-z ]{0,20}").prop_map(|(status, body)| ErrorKind::server(status, body)),
            "[a-z ]{1,20}".prop_map(ErrorKind::decode),
            "[a-z ]{1,20}".prop_map(ErrorKind::validation),
        ]
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built events for common scenarios.

    use super::*;

    pub fn fall_fest() -> Event {
        Event::new(1, "Fall Fest")
            .with_attribute("date", "2026-10-03")
            .with_attribute("location", "Riverside Park")
            .with_attribute("description", "Harvest food stalls and live music")
    }

    pub fn winter_market() -> Event {
        Event::new(2, "Winter Market")
            .with_attribute("date", "2026-12-12")
            .with_attribute("location", "Old Town Square")
            .with_attribute("description", "Crafts and mulled wine")
    }

    /// The two events the service starts with.
    pub fn festival_events() -> Vec<Event> {
        vec![fall_fest(), winter_market()]
    }

    pub fn spring_fling() -> NewEvent {
        NewEvent::new("Spring Fling")
            .with_field("date", "2027-04-17")
            .with_field("location", "Botanical Garden")
            .with_field("description", "Picnic and flower show")
    }

    /// `{ "data": [...] }` body for the read endpoint.
    pub fn envelope_json(events: &[Event]) -> String {
        serde_json::json!({ "data": events }).to_string()
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over cache snapshots and event lists.

    use super::*;

    #[track_caller]
    pub fn assert_ready(entry: &CacheEntry<Event>) {
        assert_eq!(
            entry.status(),
            CacheStatus::Ready,
            "Expected Ready entry, got: {:?}",
            entry
        );
        assert!(entry.error().is_none(), "Ready entry carries an error: {:?}", entry);
    }

    #[track_caller]
    pub fn assert_failed_with(entry: &CacheEntry<Event>, expected: &ErrorKind) {
        assert_eq!(entry.status(), CacheStatus::Error, "Expected Error entry, got: {:?}", entry);
        assert_eq!(entry.error(), Some(expected));
    }

    /// Assert the titles of `events`, in order.
    #[track_caller]
    pub fn assert_titles(events: &[Event], expected: &[&str]) {
        let titles: Vec<&str> = events.iter().map(|event| event.title.as_str()).collect();
        assert_eq!(titles, expected);
    }
}

// ============================================================================
// TESTS
// ============================================================================
