//! The single outstanding write.

use eventgrid_core::{ErrorKind, NewEvent};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteStatus {
    Sending,
    Succeeded,
    Failed,
}

impl fmt::Display for WriteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WriteStatus::Sending => "sending",
            WriteStatus::Succeeded => "succeeded",
            WriteStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// A create request the controller has accepted.
///
/// While `status` is [`WriteStatus::Sending`] no other write is accepted.
/// A failed write stays around, with its payload, until it is dismissed or
/// replaced by the next submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingWrite {
    pub payload: NewEvent,
    pub status: WriteStatus,
    pub error: Option<ErrorKind>,
}

impl PendingWrite {
    pub fn sending(payload: NewEvent) -> Self {
        Self {
            payload,
            status: WriteStatus::Sending,
            error: None,
        }
    }

    pub fn is_sending(&self) -> bool {
        self.status == WriteStatus::Sending
    }

    pub fn is_failed(&self) -> bool {
        self.status == WriteStatus::Failed
    }

    pub(crate) fn fail(&mut self, error: ErrorKind) {
        self.status = WriteStatus::Failed;
        self.error = Some(error);
    }
}
