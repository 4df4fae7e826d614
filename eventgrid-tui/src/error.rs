//! Error types for the TUI.

use crate::config::ConfigError;
use eventgrid_sync::TransportSetupError;

#[derive(Debug, thiserror::Error)]
pub enum TuiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportSetupError),
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}
