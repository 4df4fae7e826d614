//! Keyed cache store with versioned loads and change listeners.
//!
//! The store holds one mutable slot per key. It is a plain synchronous value:
//! it never blocks and never performs I/O. Whoever owns it is the single
//! writer; everyone else reads snapshots or subscribes to transitions.
//!
//! # Transitions
//!
//! | Operation       | From               | To              | Version |
//! |-----------------|--------------------|-----------------|---------|
//! | `begin_load`    | Idle, Ready, Error | Loading         | kept    |
//! | `complete_load` | any (token current)| Ready / Error   | bumped  |
//! | `invalidate`    | any                | Idle            | bumped  |
//!
//! Listeners fire once per applied transition and never for no-ops
//! (`begin_load` while Loading, `complete_load` with a stale token).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use eventgrid_core::ErrorKind;

use super::entry::CacheEntry;
use super::version::LoadToken;

type Listener<T> = Arc<dyn Fn(&CacheEntry<T>) + Send + Sync>;

/// Handle returned by [`CacheStore::subscribe`].
///
/// Pass it back to [`CacheStore::unsubscribe`] to stop receiving callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    key: String,
    id: u64,
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

struct Slot<T> {
    entry: CacheEntry<T>,
    listeners: Vec<(u64, Listener<T>)>,
}

impl<T> Slot<T> {
    fn new(key: &str) -> Self {
        Self {
            entry: CacheEntry::idle(key),
            listeners: Vec::new(),
        }
    }

    fn notify(&self) {
        for (_, listener) in &self.listeners {
            listener(&self.entry);
        }
    }
}

/// Single-writer cache of keyed collections.
///
/// Listeners are invoked synchronously while the store is being mutated, so
/// they must not call back into whatever owns the store.
pub struct CacheStore<T> {
    slots: HashMap<String, Slot<T>>,
    next_subscription: u64,
}

impl<T: Clone> CacheStore<T> {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            next_subscription: 0,
        }
    }

    /// Create a store with idle entries already registered for `keys`.
    pub fn with_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut store = Self::new();
        for key in keys {
            store.slot_mut(key.as_ref());
        }
        store
    }

    /// Current snapshot for `key`. Unknown keys read as a fresh idle entry.
    pub fn read(&self, key: &str) -> CacheEntry<T> {
        self.slots
            .get(key)
            .map(|slot| slot.entry.clone())
            .unwrap_or_else(|| CacheEntry::idle(key))
    }

    /// Move `key` to Loading and hand out a token for the pre-transition
    /// version.
    ///
    /// Returns `None` without notifying if a load is already in flight.
    pub fn begin_load(&mut self, key: &str) -> Option<LoadToken> {
        let slot = self.slot_mut(key);
        if slot.entry.is_loading() {
            return None;
        }
        let token = LoadToken::new(key, slot.entry.version());
        slot.entry.mark_loading();
        slot.notify();
        Some(token)
    }

    /// Apply the result of the load identified by `token`.
    ///
    /// Returns `false` and leaves the entry untouched when the token is stale,
    /// i.e. an invalidation or another completion happened after the load
    /// began.
    pub fn complete_load(&mut self, token: &LoadToken, result: Result<Vec<T>, ErrorKind>) -> bool {
        let slot = self.slot_mut(token.key());
        if !token.is_current(slot.entry.version()) {
            return false;
        }
        match result {
            Ok(value) => slot.entry.apply_success(value),
            Err(error) => slot.entry.apply_failure(error),
        }
        slot.notify();
        true
    }

    /// Force `key` back to Idle and bump its version, whatever its status.
    ///
    /// Any load in flight for `key` becomes stale. The previously fetched
    /// value stays readable until the next successful fetch replaces it.
    pub fn invalidate(&mut self, key: &str) {
        let slot = self.slot_mut(key);
        slot.entry.reset();
        slot.notify();
    }

    /// Register `listener` for every applied transition of `key`.
    pub fn subscribe<F>(&mut self, key: &str, listener: F) -> Subscription
    where
        F: Fn(&CacheEntry<T>) + Send + Sync + 'static,
    {
        self.next_subscription += 1;
        let id = self.next_subscription;
        self.slot_mut(key).listeners.push((id, Arc::new(listener)));
        Subscription {
            key: key.to_string(),
            id,
        }
    }

    /// Remove a listener. Returns `false` if it was already removed.
    pub fn unsubscribe(&mut self, subscription: &Subscription) -> bool {
        match self.slots.get_mut(subscription.key()) {
            Some(slot) => {
                let before = slot.listeners.len();
                slot.listeners.retain(|(id, _)| *id != subscription.id());
                slot.listeners.len() != before
            }
            None => false,
        }
    }

    /// Number of listeners registered for `key`.
    pub fn listener_count(&self, key: &str) -> usize {
        self.slots.get(key).map_or(0, |slot| slot.listeners.len())
    }

    /// Keys that have an entry.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.slots.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn slot_mut(&mut self, key: &str) -> &mut Slot<T> {
        self.slots
            .entry(key.to_string())
            .or_insert_with(|| Slot::new(key))
    }
}

impl<T: Clone> Default for CacheStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for CacheStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, slot) in &self.slots {
            map.entry(key, &slot.entry);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::entry::CacheStatus;
    use crate::cache::version::Version;
    use proptest::prelude::*;
    use std::sync::Mutex;

    const KEY: &str = "events";

    fn recording_store() -> (CacheStore<u32>, Arc<Mutex<Vec<CacheStatus>>>) {
        let mut store = CacheStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(KEY, move |entry: &CacheEntry<u32>| {
            sink.lock().unwrap().push(entry.status());
        });
        (store, seen)
    }

    #[test]
    fn test_read_unknown_key_is_idle() {
        let store: CacheStore<u32> = CacheStore::new();
        let entry = store.read(KEY);
        assert!(entry.is_idle());
        assert_eq!(entry.version(), Version::zero());
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_with_keys_registers_entries() {
        let store: CacheStore<u32> = CacheStore::with_keys([KEY]);
        assert_eq!(store.keys(), vec![KEY.to_string()]);
    }

    #[test]
    fn test_load_success_cycle() {
        let mut store = CacheStore::new();
        let token = store.begin_load(KEY).unwrap();
        assert_eq!(token.version(), Version::zero());
        assert!(store.read(KEY).is_loading());

        assert!(store.complete_load(&token, Ok(vec![1, 2, 3])));
        let entry = store.read(KEY);
        assert!(entry.is_ready());
        assert_eq!(entry.value(), &[1, 2, 3]);
        assert_eq!(entry.version(), Version::new(1));
    }

    #[test]
    fn test_load_failure_is_sticky() {
        let mut store: CacheStore<u32> = CacheStore::new();
        let token = store.begin_load(KEY).unwrap();
        store.complete_load(&token, Err(ErrorKind::server(500, "db down")));

        let entry = store.read(KEY);
        assert!(entry.is_error());
        assert_eq!(entry.error(), Some(&ErrorKind::server(500, "db down")));
        // Reading again does not change anything.
        assert_eq!(store.read(KEY), entry);
    }

    #[test]
    fn test_begin_load_while_loading_is_noop() {
        let (mut store, seen) = recording_store();
        let first = store.begin_load(KEY);
        assert!(first.is_some());
        assert!(store.begin_load(KEY).is_none());
        assert_eq!(*seen.lock().unwrap(), vec![CacheStatus::Loading]);
    }

    #[test]
    fn test_refetch_from_ready_and_error() {
        let mut store = CacheStore::new();
        let token = store.begin_load(KEY).unwrap();
        store.complete_load(&token, Ok(vec![1]));

        let token = store.begin_load(KEY).unwrap();
        assert_eq!(token.version(), Version::new(1));
        // Previous value stays visible while refetching.
        assert_eq!(store.read(KEY).value(), &[1]);
        store.complete_load(&token, Err(ErrorKind::network("reset")));

        assert!(store.begin_load(KEY).is_some());
    }

    #[test]
    fn test_stale_completion_after_invalidate_is_discarded() {
        let (mut store, seen) = recording_store();
        let token = store.begin_load(KEY).unwrap();
        store.invalidate(KEY);
        let before = store.read(KEY);

        assert!(!store.complete_load(&token, Ok(vec![9])));
        assert_eq!(store.read(KEY), before);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![CacheStatus::Loading, CacheStatus::Idle]
        );
    }

    #[test]
    fn test_stale_completion_after_newer_fetch_is_discarded() {
        let mut store = CacheStore::new();
        let old = store.begin_load(KEY).unwrap();
        store.invalidate(KEY);
        let newer = store.begin_load(KEY).unwrap();
        assert!(store.complete_load(&newer, Ok(vec![2])));

        let before = store.read(KEY);
        assert!(!store.complete_load(&old, Ok(vec![1])));
        assert_eq!(store.read(KEY), before);
        assert_eq!(store.read(KEY).value(), &[2]);
    }

    #[test]
    fn test_invalidate_from_any_state() {
        let mut store = CacheStore::new();
        store.invalidate(KEY);
        assert!(store.read(KEY).is_idle());
        assert_eq!(store.read(KEY).version(), Version::new(1));

        let token = store.begin_load(KEY).unwrap();
        store.complete_load(&token, Ok(vec![7]));
        store.invalidate(KEY);
        let entry = store.read(KEY);
        assert!(entry.is_idle());
        assert_eq!(entry.value(), &[7]);
        assert_eq!(entry.version(), Version::new(3));
    }

    #[test]
    fn test_listener_called_once_per_transition() {
        let (mut store, seen) = recording_store();
        let token = store.begin_load(KEY).unwrap();
        store.complete_load(&token, Ok(vec![1]));
        store.invalidate(KEY);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![CacheStatus::Loading, CacheStatus::Ready, CacheStatus::Idle]
        );
    }

    #[test]
    fn test_listeners_are_per_key() {
        let (mut store, seen) = recording_store();
        store.invalidate("other");
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut store: CacheStore<u32> = CacheStore::new();
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        let subscription = store.subscribe(KEY, move |_| *sink.lock().unwrap() += 1);
        assert_eq!(store.listener_count(KEY), 1);

        store.invalidate(KEY);
        assert!(store.unsubscribe(&subscription));
        assert!(!store.unsubscribe(&subscription));
        store.invalidate(KEY);

        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(store.listener_count(KEY), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Begin,
        CompleteOk(u32),
        CompleteErr,
        Invalidate,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Begin),
            any::<u32>().prop_map(Op::CompleteOk),
            Just(Op::CompleteErr),
            Just(Op::Invalidate),
        ]
    }

    proptest! {
        #[test]
        fn prop_version_never_decreases_and_stale_tokens_are_noops(
            ops in prop::collection::vec(arb_op(), 1..40)
        ) {
            let mut store: CacheStore<u32> = CacheStore::new();
            let mut tokens: Vec<LoadToken> = Vec::new();
            let mut last = store.read(KEY).version();

            for op in ops {
                match op {
                    Op::Begin => {
                        if let Some(token) = store.begin_load(KEY) {
                            tokens.push(token);
                        }
                    }
                    Op::Invalidate => store.invalidate(KEY),
                    Op::CompleteOk(_) | Op::CompleteErr if tokens.is_empty() => {}
                    complete => {
                        let token = tokens.remove(0);
                        let result = match complete {
                            Op::CompleteOk(value) => Ok(vec![value]),
                            _ => Err(ErrorKind::network("connection reset")),
                        };
                        let before = store.read(KEY);
                        let applied = store.complete_load(&token, result);
                        prop_assert_eq!(applied, token.is_current(before.version()));
                        if !applied {
                            prop_assert_eq!(store.read(KEY), before);
                        }
                    }
                }
                let now = store.read(KEY).version();
                prop_assert!(now >= last);
                last = now;
            }
        }
    }
}
