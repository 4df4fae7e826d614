//! EVENTGRID Core - Data Types
//!
//! Event records, the error taxonomy shared by every layer, and the pure
//! filter view. No I/O happens in this crate.

pub mod error;
pub mod event;
pub mod filter;

pub use error::{ErrorKind, SyncResult};
pub use event::{Event, EventEnvelope, EventId, NewEvent};
pub use filter::{filter, searchable_fields, SEARCHABLE_ATTRIBUTES};

/// Logical cache key under which the event collection is tracked.
pub const EVENTS_KEY: &str = "events";
