//! Versions and load tokens for staleness detection.
//!
//! Every applied fetch completion and every invalidation bumps an entry's
//! version. A fetch captures the version it started at in a [`LoadToken`];
//! when its result arrives, the token is compared against the entry's current
//! version and the result is discarded if anything happened in between.

use std::fmt;

/// Monotonically increasing version of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version(u64);

impl Version {
    /// Version of a freshly created entry.
    pub fn zero() -> Self {
        Self(0)
    }

    pub fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    pub fn sequence(&self) -> u64 {
        self.0
    }

    /// The version that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Check if this version is newer than another.
    pub fn is_newer_than(&self, other: &Version) -> bool {
        self.0 > other.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Proof that a load was started, carrying the version it started at.
///
/// Tokens are only minted by `CacheStore::begin_load` and are consumed by
/// `CacheStore::complete_load`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadToken {
    key: String,
    version: Version,
}

impl LoadToken {
    pub(crate) fn new(key: impl Into<String>, version: Version) -> Self {
        Self {
            key: key.into(),
            version,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Version of the entry when the load began.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Whether a load started at this token is still current for `current`.
    pub fn is_current(&self, current: Version) -> bool {
        self.version == current
    }
}
