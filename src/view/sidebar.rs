//! Sidebar and spotlight: discovered sources and cache keys.

use crate::model::Suggestion;
use crate::view::styles::Palette;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate `text` to `width` terminal cells, marking cuts with `…`.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// What the sidebar shows.
pub struct SidebarContent<'a> {
    /// Discovered sources.
    pub suggestions: &'a [Suggestion],
    /// Highlighted suggestion.
    pub cursor: Option<usize>,
    /// Enumerated cache keys.
    pub cache_keys: &'a [String],
    /// Key chosen from the cache listing.
    pub selected_cache_key: Option<&'a str>,
    /// Whether an enumeration is in flight.
    pub loading_cache_keys: bool,
}

/// Sidebar widget.
pub struct Sidebar<'a> {
    content: SidebarContent<'a>,
    palette: Palette,
}

impl<'a> Sidebar<'a> {
    /// Create the widget.
    pub fn new(content: SidebarContent<'a>, palette: Palette) -> Self {
        Self { content, palette }
    }
}

fn suggestion_lines(
    suggestions: &[Suggestion],
    cursor: Option<usize>,
    width: usize,
    palette: Palette,
) -> Vec<Line<'static>> {
    if suggestions.is_empty() {
        return vec![Line::styled("No logs found", palette.muted())];
    }
    suggestions
        .iter()
        .enumerate()
        .map(|(i, suggestion)| {
            let name = suggestion
                .file_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| suggestion.file_path.display().to_string());
            let text = truncate_to_width(&name, width);
            if cursor == Some(i) {
                Line::styled(format!("> {text}"), palette.cursor())
            } else {
                Line::raw(format!("  {text}"))
            }
        })
        .collect()
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_width = area.width.saturating_sub(3) as usize;
        let content = &self.content;
        let mut lines = suggestion_lines(content.suggestions, content.cursor, inner_width, self.palette);

        if content.loading_cache_keys {
            lines.push(Line::raw(""));
            lines.push(Line::styled("Loading cache keys…", self.palette.muted()));
        } else if !content.cache_keys.is_empty() {
            lines.push(Line::raw(""));
            lines.push(Line::styled("Cache keys", self.palette.muted()));
            for key in content.cache_keys {
                let text = truncate_to_width(key, inner_width);
                if content.selected_cache_key == Some(key.as_str()) {
                    lines.push(Line::styled(format!("* {text}"), self.palette.selected()));
                } else {
                    lines.push(Line::raw(format!("  {text}")));
                }
            }
        }

        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(self.palette.muted())
            .title("Logs");
        Paragraph::new(lines).block(block).render(area, buf);
    }
}

/// Quick-open popup over the discovered sources.
pub struct Spotlight<'a> {
    suggestions: &'a [Suggestion],
    cursor: Option<usize>,
    palette: Palette,
}

impl<'a> Spotlight<'a> {
    /// Create the widget.
    pub fn new(suggestions: &'a [Suggestion], cursor: Option<usize>, palette: Palette) -> Self {
        Self {
            suggestions,
            cursor,
            palette,
        }
    }
}

impl Widget for Spotlight<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let width = area.width.saturating_sub(4) as usize;
        let lines = suggestion_lines(self.suggestions, self.cursor, width, self.palette);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.palette.engaged())
            .title("Open log (Enter to open, Esc to close)");
        Paragraph::new(lines).block(block).render(area, buf);
    }
}
