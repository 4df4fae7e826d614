//! Detail panel widget for one event.

use eventgrid_core::Event;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;

pub struct DetailPanel<'a> {
    pub title: &'a str,
    pub event: &'a Event,
    pub label_style: Style,
}

impl<'a> DetailPanel<'a> {
    /// Label/value pairs: identity and title first, then every attribute in
    /// key order.
    pub fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("Id".to_string(), self.event.id.to_string()),
            ("Title".to_string(), self.event.title.clone()),
        ];
        for (key, value) in &self.event.attributes {
            fields.push((capitalize(key), display_value(value)));
        }
        fields
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let lines: Vec<Line> = self
            .fields()
            .into_iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("{}: ", label), self.label_style.add_modifier(Modifier::BOLD)),
                    Span::raw(value),
                ])
            })
            .collect();

        let widget = Paragraph::new(Text::from(lines))
            .block(Block::default().title(self.title).borders(Borders::ALL))
            .wrap(Wrap { trim: true });

        f.render_widget(widget, area);
    }
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
