//! Details pane for the selected entry.

use crate::model::LogEntry;
use crate::view::styles::Palette;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Pretty-printed metadata, or `None` if the entry has none.
pub fn format_meta(entry: &LogEntry) -> Option<String> {
    let meta = entry.meta().filter(|_| entry.has_meta())?;
    Some(serde_json::to_string_pretty(meta).unwrap_or_else(|_| meta.to_string()))
}

/// Details pane widget.
pub struct DetailsPane<'a> {
    entry: Option<&'a LogEntry>,
    palette: Palette,
}

impl<'a> DetailsPane<'a> {
    /// Create the widget.
    pub fn new(entry: Option<&'a LogEntry>, palette: Palette) -> Self {
        Self { entry, palette }
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let Some(entry) = self.entry else {
            return vec![Line::styled("Nothing selected", self.palette.muted())];
        };

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Timestamp: ", self.palette.muted()),
                Span::raw(entry.timestamp()),
            ]),
            Line::from(vec![
                Span::styled("Level: ", self.palette.muted()),
                Span::styled(entry.level().as_str(), self.palette.level(entry.level())),
            ]),
            Line::from(vec![
                Span::styled("Source: ", self.palette.muted()),
                Span::raw(entry.log_type().as_str()),
            ]),
            Line::raw(""),
            Line::raw(entry.message()),
        ];

        if let Some(meta) = format_meta(entry) {
            lines.push(Line::raw(""));
            lines.extend(meta.lines().map(|l| Line::raw(l.to_string())));
        }
        lines
    }
}

impl Widget for DetailsPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::LEFT)
            .border_style(self.palette.muted())
            .title("Details");
        Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
