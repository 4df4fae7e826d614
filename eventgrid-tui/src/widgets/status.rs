//! Status indicator widget.

use eventgrid_core::Event;
use eventgrid_storage::CacheEntry;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct StatusIndicator {
    pub title: String,
    pub status: String,
    pub style: Style,
}

impl StatusIndicator {
    /// Summary of a cache entry, e.g. `ready v3 | 2 events | 12s ago`.
    pub fn for_entry(entry: &CacheEntry<Event>, style: Style) -> Self {
        let mut status = format!(
            "{} {} | {} events",
            entry.status(),
            entry.version(),
            entry.value().len()
        );
        if let Some(age) = entry.staleness() {
            status.push_str(&format!(" | {}s ago", age.as_secs()));
        }
        Self {
            title: "Cache".to_string(),
            status,
            style,
        }
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let paragraph = Paragraph::new(self.status.clone()).style(self.style).block(
            Block::default()
                .title(self.title.as_str())
                .borders(Borders::ALL),
        );
        f.render_widget(paragraph, area);
    }
}
