//! Error types for EVENTGRID operations

use thiserror::Error;

/// Uniform failure value produced by the transport and surfaced by the
/// sync controller.
///
/// Every variant owns plain data so a failure can be cloned into a cache
/// entry and handed to every caller that awaited the same fetch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote service was unreachable, the request timed out, or the
    /// body could not be read.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The remote service answered with a non-success status.
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// The payload could not be parsed as the expected shape.
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// A write was rejected with a domain-specific reason.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A write was attempted while another one is still in flight.
    #[error("Another event is still being submitted")]
    Busy,
}

impl ErrorKind {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Display-only text shown in place of the event grid after a failed read.
    pub fn user_message(&self) -> String {
        format!("Error loading events: {}", self)
    }
}

/// Result type alias for EVENTGRID operations.
pub type SyncResult<T> = Result<T, ErrorKind>;
