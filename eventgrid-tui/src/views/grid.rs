//! Event grid view.

use crate::state::App;
use crate::widgets::DetailPanel;
use eventgrid_core::Event;
use eventgrid_sync::EventTransport;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub const LOADING_TEXT: &str = "Loading events...";

pub fn render<T: EventTransport + 'static>(f: &mut Frame<'_>, app: &App<T>, area: Rect) {
    let entry = &app.entry;

    // Stale values stay on screen while a refetch runs.
    if entry.value().is_empty() && (entry.is_loading() || entry.is_idle()) {
        render_message(f, app, area, LOADING_TEXT.to_string(), app.theme.text_dim);
        return;
    }
    if let Some(error) = entry.error() {
        render_message(f, app, area, error.user_message(), app.theme.error);
        return;
    }

    let events = app.visible_events();
    if events.is_empty() {
        let message = if app.query.trim().is_empty() {
            "No events yet. Press n to add one.".to_string()
        } else {
            format!("No events match \"{}\"", app.query.trim())
        };
        render_message(f, app, area, message, app.theme.text_dim);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let items: Vec<ListItem> = events.iter().map(|event| card(app, event)).collect();

    let mut state = ListState::default();
    if let Some(selected) = &app.selected {
        state.select(events.iter().position(|event| &event.id == selected));
    }

    let title = format!("Events ({}/{})", events.len(), entry.value().len());
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().fg(app.theme.primary).bg(app.theme.bg_highlight))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, chunks[0], &mut state);

    if let Some(event) = app.selected_event() {
        let detail = DetailPanel {
            title: "Details",
            event: &event,
            label_style: Style::default().fg(app.theme.secondary),
        };
        detail.render(f, chunks[1]);
    }
}

fn card<'a, T: EventTransport + 'static>(app: &App<T>, event: &'a Event) -> ListItem<'a> {
    let mut lines = vec![Line::from(Span::styled(
        event.title.as_str(),
        Style::default().fg(app.theme.text),
    ))];
    let meta: Vec<&str> = ["date", "location"]
        .iter()
        .filter_map(|key| event.attribute_str(key))
        .collect();
    if !meta.is_empty() {
        lines.push(Line::from(Span::styled(
            meta.join(" • "),
            Style::default().fg(app.theme.text_dim),
        )));
    }
    ListItem::new(lines)
}

fn render_message<T: EventTransport + 'static>(
    f: &mut Frame<'_>,
    app: &App<T>,
    area: Rect,
    message: String,
    color: ratatui::style::Color,
) {
    let paragraph = Paragraph::new(message)
        .alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(paragraph, area);
}
