//! Sync controller.
//!
//! Owns the cache store for the event collection and mediates every read and
//! write between the UI and the transport:
//!
//! - `ensure_loaded` fetches at most once per Idle period. Callers arriving
//!   while a fetch is in flight await that same fetch.
//! - `submit_event` allows a single write at a time. A second submission while
//!   one is sending fails with [`ErrorKind::Busy`] and leaves the first alone.
//! - A successful write invalidates the collection, so the next
//!   `ensure_loaded` refetches it.
//! - A failed fetch leaves the entry in Error until `refetch` or `invalidate`.
//!
//! The controller is meant for a single-threaded executor, but its state is
//! guarded by short-lived mutexes so it can be shared behind an `Arc`. No lock
//! is held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use eventgrid_core::{filter, ErrorKind, Event, NewEvent, EVENTS_KEY};
use eventgrid_storage::{CacheEntry, CacheStore, LoadToken, Subscription};
use futures_util::future::{BoxFuture, FutureExt, Shared};

use crate::transport::EventTransport;
use crate::write::PendingWrite;

type SharedFetch = Shared<BoxFuture<'static, CacheEntry<Event>>>;

struct InFlight {
    token: LoadToken,
    fetch: SharedFetch,
}

struct SyncState {
    store: Mutex<CacheStore<Event>>,
    in_flight: Mutex<Option<InFlight>>,
    pending: Mutex<Option<PendingWrite>>,
}

impl SyncState {
    fn new() -> Self {
        Self {
            store: Mutex::new(CacheStore::with_keys([EVENTS_KEY])),
            in_flight: Mutex::new(None),
            pending: Mutex::new(None),
        }
    }
}

enum FetchState {
    Running(SharedFetch),
    Settled(CacheEntry<Event>),
}

/// Client-side owner of the event collection.
pub struct SyncController<T: EventTransport + 'static> {
    transport: Arc<T>,
    state: Arc<SyncState>,
}

impl<T: EventTransport + 'static> SyncController<T> {
    pub fn new(transport: T) -> Self {
        Self::from_arc(Arc::new(transport))
    }

    pub fn from_arc(transport: Arc<T>) -> Self {
        Self {
            transport,
            state: Arc::new(SyncState::new()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Current snapshot of the event collection.
    pub fn snapshot(&self) -> CacheEntry<Event> {
        lock(&self.state.store).read(EVENTS_KEY)
    }

    /// Fetch the collection if nothing has been loaded since the last
    /// invalidation, and return the resulting snapshot.
    ///
    /// - Idle: starts a fetch and awaits it.
    /// - Loading: awaits the fetch already in flight; no new request is made.
    /// - Ready or Error: returns the snapshot as is. Errors are sticky.
    pub async fn ensure_loaded(&self) -> CacheEntry<Event> {
        match self.start_fetch(false) {
            FetchState::Running(fetch) => fetch.await,
            FetchState::Settled(entry) => entry,
        }
    }

    /// Fetch the collection again from Ready or Error.
    ///
    /// This is the manual retry path. While a fetch is in flight it coalesces
    /// like [`ensure_loaded`](Self::ensure_loaded).
    pub async fn refetch(&self) -> CacheEntry<Event> {
        match self.start_fetch(true) {
            FetchState::Running(fetch) => fetch.await,
            FetchState::Settled(entry) => entry,
        }
    }

    /// Mark the collection stale.
    ///
    /// A fetch in flight keeps running for whoever awaits it, but its result
    /// is discarded.
    pub fn invalidate(&self) {
        let mut in_flight = lock(&self.state.in_flight);
        *in_flight = None;
        lock(&self.state.store).invalidate(EVENTS_KEY);
        tracing::debug!(key = EVENTS_KEY, "collection invalidated");
    }

    /// Case-insensitive filtered view of the current collection.
    pub fn view(&self, query: &str) -> Vec<Event> {
        filter(self.snapshot().value(), query)
    }

    /// Register a callback for every transition of the event collection.
    ///
    /// Callbacks run synchronously while the store is locked and must not
    /// call back into the controller.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CacheEntry<Event>) + Send + Sync + 'static,
    {
        lock(&self.state.store).subscribe(EVENTS_KEY, listener)
    }

    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        lock(&self.state.store).unsubscribe(subscription)
    }

    /// The write currently sending, or the last failed one.
    pub fn pending_write(&self) -> Option<PendingWrite> {
        lock(&self.state.pending).clone()
    }

    /// Forget a failed write. Returns `false` if there was none.
    pub fn dismiss_failed_write(&self) -> bool {
        let mut pending = lock(&self.state.pending);
        if pending.as_ref().is_some_and(PendingWrite::is_failed) {
            *pending = None;
            return true;
        }
        false
    }

    /// Create an event.
    ///
    /// Fails with [`ErrorKind::Busy`] while another write is sending. On
    /// success the collection is invalidated; on failure the write is kept as
    /// [`PendingWrite`] with its error and the cache is left untouched.
    pub async fn submit_event(&self, payload: NewEvent) -> Result<Event, ErrorKind> {
        {
            let mut pending = lock(&self.state.pending);
            if pending.as_ref().is_some_and(PendingWrite::is_sending) {
                tracing::warn!(title = %payload.title, "write rejected while another is sending");
                return Err(ErrorKind::Busy);
            }
            *pending = Some(PendingWrite::sending(payload.clone()));
        }

        match self.transport.submit_event(&payload).await {
            Ok(event) => {
                *lock(&self.state.pending) = None;
                self.invalidate();
                tracing::info!(event_id = %event.id, title = %event.title, "event created");
                Ok(event)
            }
            Err(error) => {
                if let Some(write) = lock(&self.state.pending).as_mut() {
                    write.fail(error.clone());
                }
                Err(error)
            }
        }
    }

    fn start_fetch(&self, force: bool) -> FetchState {
        let mut in_flight = lock(&self.state.in_flight);
        if let Some(current) = in_flight.as_ref() {
            tracing::debug!(key = EVENTS_KEY, "joining in-flight fetch");
            return FetchState::Running(current.fetch.clone());
        }

        let mut store = lock(&self.state.store);
        let entry = store.read(EVENTS_KEY);
        if !force && !entry.is_idle() {
            return FetchState::Settled(entry);
        }
        let Some(token) = store.begin_load(EVENTS_KEY) else {
            return FetchState::Settled(entry);
        };
        drop(store);

        tracing::debug!(key = EVENTS_KEY, version = %token.version(), "starting fetch");
        let fetch = self.fetch(token.clone()).shared();
        *in_flight = Some(InFlight {
            token,
            fetch: fetch.clone(),
        });
        FetchState::Running(fetch)
    }

    fn fetch(&self, token: LoadToken) -> BoxFuture<'static, CacheEntry<Event>> {
        let transport = Arc::clone(&self.transport);
        let state = Arc::clone(&self.state);
        async move {
            let result = transport.fetch_collection().await;

            let mut in_flight = lock(&state.in_flight);
            if in_flight.as_ref().is_some_and(|f| f.token == token) {
                *in_flight = None;
            }
            let mut store = lock(&state.store);
            if !store.complete_load(&token, result) {
                tracing::debug!(
                    key = EVENTS_KEY,
                    version = %token.version(),
                    "discarded stale fetch result"
                );
            }
            store.read(EVENTS_KEY)
        }
        .boxed()
    }
}

fn lock<S>(mutex: &Mutex<S>) -> MutexGuard<'_, S> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
