//! EVENTGRID Sync - Data Sync Controller
//!
//! Connects the cache store to the remote event service: a transport adapter
//! that normalizes remote failures, and a controller that coalesces fetches,
//! serializes writes and invalidates the cache when a write lands.

pub mod controller;
pub mod transport;
pub mod write;

pub use controller::SyncController;
pub use transport::{EventTransport, RestTransport, TransportSetupError};
pub use write::{PendingWrite, WriteStatus};
