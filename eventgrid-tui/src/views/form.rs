//! Add-event popup.

use crate::form::{EventForm, FormField};
use crate::state::App;
use crate::theme::{focus_color, write_status_color};
use crate::views::centered_rect;
use eventgrid_sync::{EventTransport, WriteStatus};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render<T: EventTransport + 'static>(f: &mut Frame<'_>, app: &App<T>, form: &EventForm) {
    let area = centered_rect(60, 70, f.size());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title("New Event")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.secondary));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut constraints: Vec<Constraint> = FormField::ALL.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (index, field) in FormField::ALL.iter().enumerate() {
        let focused = form.focus == *field;
        let mut spans = vec![Span::raw(form.value(*field))];
        if focused && !form.is_sending() {
            spans.push(Span::raw("_"));
        }
        let input = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .title(field.label())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(focus_color(focused, &app.theme))),
        );
        f.render_widget(input, rows[index]);
    }

    let status_line = match (form.status, &form.error) {
        (_, Some(error)) => Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(app.theme.error),
        )),
        (Some(status), None) => Line::from(Span::styled(
            status_label(status),
            Style::default().fg(write_status_color(status, &app.theme)),
        )),
        (None, None) => Line::from(Span::styled(
            "Enter to add the event",
            Style::default().fg(app.theme.text_dim),
        )),
    };
    let footer = Paragraph::new(status_line).wrap(Wrap { trim: true });
    f.render_widget(footer, rows[FormField::ALL.len()]);
}

fn status_label(status: WriteStatus) -> &'static str {
    match status {
        WriteStatus::Sending => "Sending...",
        WriteStatus::Succeeded => "Added",
        WriteStatus::Failed => "Failed",
    }
}
