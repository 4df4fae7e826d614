//! Notification system for the TUI.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl NotificationLevel {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "INFO",
            NotificationLevel::Warning => "WARN",
            NotificationLevel::Error => "ERROR",
            NotificationLevel::Success => "SUCCESS",
        }
    }
}

/// Follow-up the footer offers alongside a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    Retry,
    Dismiss,
}

impl NotificationAction {
    pub fn hint(&self) -> &'static str {
        match self {
            NotificationAction::Retry => "r retry",
            NotificationAction::Dismiss => "Esc dismiss",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub action: Option<NotificationAction>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            action: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Footer text, e.g. `ERROR: db down [r retry]`.
    pub fn render_text(&self) -> String {
        match self.action {
            Some(action) => format!("{}: {} [{}]", self.level.label(), self.message, action.hint()),
            None => format!("{}: {}", self.level.label(), self.message),
        }
    }
}
