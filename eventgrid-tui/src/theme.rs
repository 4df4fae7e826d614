//! SynthBrute theme and color utilities.

use crate::notifications::NotificationLevel;
use eventgrid_storage::CacheStatus;
use eventgrid_sync::WriteStatus;
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct SynthBruteTheme {
    pub bg: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub tertiary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl SynthBruteTheme {
    pub fn synthbrute() -> Self {
        Self {
            bg: Color::Rgb(10, 10, 10),
            bg_highlight: Color::Rgb(42, 42, 42),
            primary: Color::Rgb(0, 255, 255),
            primary_dim: Color::Rgb(0, 136, 136),
            secondary: Color::Rgb(255, 0, 255),
            tertiary: Color::Rgb(255, 255, 0),
            success: Color::Rgb(0, 255, 0),
            warning: Color::Rgb(255, 255, 0),
            error: Color::Rgb(255, 0, 0),
            info: Color::Rgb(0, 255, 255),
            text: Color::Rgb(255, 255, 255),
            text_dim: Color::Rgb(136, 136, 136),
            border: Color::Rgb(68, 68, 68),
            border_focus: Color::Rgb(0, 255, 255),
        }
    }
}

impl Default for SynthBruteTheme {
    fn default() -> Self {
        Self::synthbrute()
    }
}

pub fn cache_status_color(status: CacheStatus, theme: &SynthBruteTheme) -> Color {
    match status {
        CacheStatus::Idle => theme.text_dim,
        CacheStatus::Loading => theme.warning,
        CacheStatus::Ready => theme.success,
        CacheStatus::Error => theme.error,
    }
}

pub fn write_status_color(status: WriteStatus, theme: &SynthBruteTheme) -> Color {
    match status {
        WriteStatus::Sending => theme.warning,
        WriteStatus::Succeeded => theme.success,
        WriteStatus::Failed => theme.error,
    }
}

pub fn notification_color(level: NotificationLevel, theme: &SynthBruteTheme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
        NotificationLevel::Success => theme.success,
    }
}

/// Border color for an input that may have focus.
pub fn focus_color(focused: bool, theme: &SynthBruteTheme) -> Color {
    if focused {
        theme.border_focus
    } else {
        theme.border
    }
}
