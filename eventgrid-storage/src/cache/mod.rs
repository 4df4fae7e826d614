//! Cache layer with explicit staleness and versioned loads.
//!
//! This module provides the single-writer store behind the sync controller.
//!
//! # Design Philosophy
//!
//! Caches that hide their staleness lead to subtle bugs. Every entry here
//! carries its [`CacheStatus`] and [`Version`]; a load must present the
//! [`LoadToken`] it was started with, and a result whose token no longer
//! matches is dropped instead of overwriting newer state.
//!
//! # Example
//!
//! ```
//! use eventgrid_storage::cache::CacheStore;
//!
//! let mut store: CacheStore<String> = CacheStore::new();
//! let token = store.begin_load("events").expect("not loading yet");
//!
//! // A write lands before the fetch returns.
//! store.invalidate("events");
//!
//! // The fetch result is stale and discarded.
//! assert!(!store.complete_load(&token, Ok(vec!["old".to_string()])));
//! assert!(store.read("events").is_idle());
//! ```

pub mod entry;
pub mod store;
pub mod version;

pub use entry::{CacheEntry, CacheStatus};
pub use store::{CacheStore, Subscription};
pub use version::{LoadToken, Version};
