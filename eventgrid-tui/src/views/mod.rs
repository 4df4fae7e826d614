//! View rendering.

pub mod form;
pub mod grid;

use crate::keys::InputMode;
use crate::state::App;
use crate::theme::{cache_status_color, focus_color, notification_color};
use crate::widgets::{SearchBar, StatusIndicator};
use eventgrid_sync::EventTransport;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_view<T: EventTransport + 'static>(f: &mut Frame<'_>, app: &App<T>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);
    render_search(f, app, layout[1]);
    grid::render(f, app, layout[2]);
    render_footer(f, app, layout[3]);

    if let Some(form) = &app.form {
        form::render(f, app, form);
    }
}

fn render_header<T: EventTransport + 'static>(f: &mut Frame<'_>, app: &App<T>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(40)])
        .split(area);

    let block = Block::default().borders(Borders::ALL).title(Span::styled(
        "EVENTGRID",
        Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::BOLD),
    ));
    let subtitle = Paragraph::new(app.config.api_base_url.as_str())
        .style(Style::default().fg(app.theme.text_dim))
        .block(block);
    f.render_widget(subtitle, chunks[0]);

    let status_style = Style::default().fg(cache_status_color(app.entry.status(), &app.theme));
    StatusIndicator::for_entry(&app.entry, status_style).render(f, chunks[1]);
}

fn render_search<T: EventTransport + 'static>(f: &mut Frame<'_>, app: &App<T>, area: Rect) {
    let focused = app.mode == InputMode::Search;
    let bar = SearchBar {
        query: &app.query,
        focused,
        placeholder: "Search events...",
        border_style: Style::default().fg(focus_color(focused, &app.theme)),
        text_style: Style::default().fg(app.theme.text),
        placeholder_style: Style::default().fg(app.theme.text_dim),
    };
    bar.render(f, area);
}

fn render_footer<T: EventTransport + 'static>(f: &mut Frame<'_>, app: &App<T>, area: Rect) {
    let help = match app.mode {
        InputMode::Normal => "j/k move • / search • n new event • r refresh • q quit",
        InputMode::Search => "type to filter • Enter keep • Esc clear",
        InputMode::Form => "Tab next field • Enter submit • Esc close",
    };
    let (text, style) = match app.notifications.last() {
        Some(note) => (
            note.render_text(),
            Style::default().fg(notification_color(note.level, &app.theme)),
        ),
        None => (help.to_string(), Style::default().fg(app.theme.text_dim)),
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}

/// A rectangle of the given percentage size centered in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
