//! Cache entries and their load status.
//!
//! An entry is the last known state of one keyed collection. Readers always
//! get a cloned snapshot, never a live reference into the store.

use chrono::{DateTime, Utc};
use eventgrid_core::ErrorKind;
use std::fmt;
use std::time::Duration;

use super::version::Version;

/// Load status of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CacheStatus {
    /// No fetch has been applied since creation or the last invalidation.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The value reflects the most recent successful fetch.
    Ready,
    /// The last fetch failed; the cause is kept until the next refetch.
    Error,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CacheStatus::Idle => "idle",
            CacheStatus::Loading => "loading",
            CacheStatus::Ready => "ready",
            CacheStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// Snapshot of one keyed collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    key: String,
    value: Vec<T>,
    status: CacheStatus,
    error: Option<ErrorKind>,
    version: Version,
    fetched_at: Option<DateTime<Utc>>,
}

impl<T> CacheEntry<T> {
    /// A fresh entry: idle, empty, version zero.
    pub fn idle(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Vec::new(),
            status: CacheStatus::Idle,
            error: None,
            version: Version::zero(),
            fetched_at: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The cached collection.
    ///
    /// After an invalidation or a failed refetch this still holds the last
    /// successfully fetched collection; check [`status`](Self::status) before
    /// treating it as current.
    pub fn value(&self) -> &[T] {
        &self.value
    }

    pub fn into_value(self) -> Vec<T> {
        self.value
    }

    pub fn status(&self) -> CacheStatus {
        self.status
    }

    pub fn error(&self) -> Option<&ErrorKind> {
        self.error.as_ref()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn is_idle(&self) -> bool {
        self.status == CacheStatus::Idle
    }

    pub fn is_loading(&self) -> bool {
        self.status == CacheStatus::Loading
    }

    pub fn is_ready(&self) -> bool {
        self.status == CacheStatus::Ready
    }

    pub fn is_error(&self) -> bool {
        self.status == CacheStatus::Error
    }

    /// Time since the value was last replaced by a successful fetch.
    ///
    /// `None` if nothing has been fetched yet.
    pub fn staleness(&self) -> Option<Duration> {
        let fetched_at = self.fetched_at?;
        let age = Utc::now().signed_duration_since(fetched_at);
        Some(age.to_std().unwrap_or(Duration::ZERO))
    }

    pub(crate) fn mark_loading(&mut self) {
        self.status = CacheStatus::Loading;
    }

    pub(crate) fn apply_success(&mut self, value: Vec<T>) {
        self.value = value;
        self.status = CacheStatus::Ready;
        self.error = None;
        self.fetched_at = Some(Utc::now());
        self.version = self.version.next();
    }

    pub(crate) fn apply_failure(&mut self, error: ErrorKind) {
        self.status = CacheStatus::Error;
        self.error = Some(error);
        self.version = self.version.next();
    }

    pub(crate) fn reset(&mut self) {
        self.status = CacheStatus::Idle;
        self.error = None;
        self.version = self.version.next();
    }
}
