//! EVENTGRID Storage - Client-side Cache
//!
//! Holds the last known good collection per key, tracks its load status and
//! version, and notifies listeners on every transition.

pub mod cache;

pub use cache::{CacheEntry, CacheStatus, CacheStore, LoadToken, Subscription, Version};
