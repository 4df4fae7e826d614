//! Event types for the TUI event loop.

use crossterm::event::KeyEvent;
use eventgrid_core::{ErrorKind, Event};
use eventgrid_storage::CacheStatus;

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Input(KeyEvent),
    Tick,
    Resize { width: u16, height: u16 },
    /// The event collection moved to a new status.
    CacheChanged(CacheStatus),
    /// A submitted event came back from the service.
    WriteFinished(Result<Event, ErrorKind>),
}
