//! Search bar widget.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct SearchBar<'a> {
    pub query: &'a str,
    pub focused: bool,
    pub placeholder: &'a str,
    pub border_style: Style,
    pub text_style: Style,
    pub placeholder_style: Style,
}

impl<'a> SearchBar<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let mut spans = Vec::new();
        if self.query.is_empty() && !self.focused {
            spans.push(Span::styled(self.placeholder, self.placeholder_style));
        } else {
            spans.push(Span::styled(self.query, self.text_style));
            if self.focused {
                spans.push(Span::styled("_", self.text_style));
            }
        }

        let paragraph = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .title("Search [/]")
                .borders(Borders::ALL)
                .border_style(self.border_style),
        );
        f.render_widget(paragraph, area);
    }
}
