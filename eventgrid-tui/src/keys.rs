//! Keybinding definitions for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What keystrokes are routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing into the search bar.
    Search,
    /// Typing into the add-event form.
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    OpenSearch,
    NewEvent,
    Refresh,
    NextField,
    PrevField,
    Insert(char),
    Backspace,
    Confirm,
    Cancel,
}

pub fn map_key(event: KeyEvent, mode: InputMode) -> Option<Action> {
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = event;

    if kind == KeyEventKind::Release {
        return None;
    }

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        };
    }

    match mode {
        InputMode::Normal => match code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('/') => Some(Action::OpenSearch),
            KeyCode::Char('n') | KeyCode::Char('+') => Some(Action::NewEvent),
            KeyCode::Char('r') => Some(Action::Refresh),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
            KeyCode::Enter => Some(Action::Confirm),
            KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        },
        InputMode::Search | InputMode::Form => match code {
            KeyCode::Enter => Some(Action::Confirm),
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Tab => Some(Action::NextField),
            KeyCode::BackTab => Some(Action::PrevField),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Up => Some(Action::MoveUp),
            KeyCode::Down => Some(Action::MoveDown),
            KeyCode::Char(c) => Some(Action::Insert(c)),
            _ => None,
        },
    }
}
