//! Log table widget.
//!
//! Receives rows already projected for the visible window; it never sees
//! the full entry collection.

use crate::view::styles::Palette;
use crate::view_state::log_table::{HAS_META_GLYPH, LEVEL_COLUMN_WIDTH, TIMESTAMP_COLUMN_WIDTH, TableRow};
use crate::view_state::types::RowIndex;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, Widget},
};

/// Log table widget.
pub struct LogTable<'a> {
    rows: &'a [TableRow<'a>],
    first_visible: RowIndex,
    cursor: Option<usize>,
    palette: Palette,
}

impl<'a> LogTable<'a> {
    /// Create the widget. Rows before `first_visible` (overscan) are not
    /// drawn.
    pub fn new(rows: &'a [TableRow<'a>], first_visible: RowIndex, cursor: Option<usize>, palette: Palette) -> Self {
        Self {
            rows,
            first_visible,
            cursor,
            palette,
        }
    }

    fn row_style(&self, row: &TableRow<'_>) -> Style {
        if self.cursor == Some(row.row.get()) {
            self.palette.cursor()
        } else if row.is_selected {
            self.palette.selected()
        } else if row.is_search_match {
            self.palette.search_match()
        } else {
            Style::default()
        }
    }

    fn to_row(&self, row: &TableRow<'a>) -> Row<'a> {
        let timestamp = Line::from(vec![
            Span::raw(row.glyph.symbol()),
            Span::raw(" "),
            Span::raw(row.timestamp.clone()),
        ]);
        let level = Span::styled(row.level.as_str(), self.palette.level(row.level));
        let message = if row.has_meta {
            Line::from(vec![Span::raw(HAS_META_GLYPH), Span::raw(" "), Span::raw(row.message)])
        } else {
            Line::from(row.message)
        };

        Row::new(vec![Cell::from(timestamp), Cell::from(level), Cell::from(message)])
            .style(self.row_style(row))
    }
}

impl Widget for LogTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.rows.is_empty() {
            Paragraph::new(Line::styled("No entries to show", self.palette.muted())).render(area, buf);
            return;
        }

        let visible: Vec<Row> = self
            .rows
            .iter()
            .filter(|r| r.row >= self.first_visible)
            .map(|r| self.to_row(r))
            .collect();

        let header = Row::new(vec!["Timestamp", "Level", "Message"]).style(self.palette.muted());
        let widths = [
            Constraint::Length(TIMESTAMP_COLUMN_WIDTH),
            Constraint::Length(LEVEL_COLUMN_WIDTH),
            Constraint::Min(0),
        ];

        Widget::render(Table::new(visible, widths).header(header).column_spacing(1), area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LogEntry, LogFile, LogLevel, LogType};
    use crate::prefs::DateTimeFormat;
    use crate::view::styles::ColorConfig;
    use crate::view_state::log_table::project_rows;
    use crate::view_state::pipeline::{FilteredView, ViewPredicates};
    use crate::view_state::visible_range::VisibleRange;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn buffer_to_string(buffer: &Buffer) -> String {
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn file() -> LogFile {
        let entries = (0..50)
            .map(|i| {
                let e = LogEntry::new(format!("raw-{i:02}"), LogLevel::Info, format!("message {i:02}"), LogType::Browser);
                if i == 1 {
                    e.with_meta(serde_json::json!({"k": 1}))
                } else {
                    e
                }
            })
            .collect();
        LogFile::processed("browser.log", LogType::Browser, entries)
    }

    fn render(file: &LogFile, scroll_top: usize) -> String {
        let predicates = ViewPredicates {
            sort: crate::prefs::SortDirection::Ascending,
            ..ViewPredicates::default()
        };
        let view = FilteredView::compute(file, &predicates);
        let range = VisibleRange::compute(view.len(), scroll_top, 5, 3);
        let rows = project_rows(file, &view, &range, &DateTimeFormat::default(), None);

        let mut terminal = Terminal::new(TestBackend::new(80, 6)).expect("terminal");
        terminal
            .draw(|frame| {
                let palette = Palette::new(true, ColorConfig::new(false));
                frame.render_widget(LogTable::new(&rows, range.first_visible, None, palette), frame.area());
            })
            .expect("draw");
        buffer_to_string(terminal.backend().buffer())
    }

    #[test]
    fn renders_columns_and_raw_timestamp_fallback() {
        let text = render(&file(), 0);
        assert!(text.contains("Timestamp"));
        assert!(text.contains("raw-00"), "got:\n{text}");
        assert!(text.contains("message 00"));
    }

    #[test]
    fn meta_rows_get_glyph() {
        let text = render(&file(), 0);
        assert!(text.contains(&format!("{HAS_META_GLYPH} message 01")), "got:\n{text}");
    }

    #[test]
    fn overscan_rows_are_not_drawn() {
        let text = render(&file(), 20);
        assert!(text.contains("message 20"));
        assert!(!text.contains("message 19"), "got:\n{text}");
    }

    #[test]
    fn empty_table_shows_placeholder() {
        let empty = LogFile::processed("x.log", LogType::Browser, Vec::new());
        assert!(render(&empty, 0).contains("No entries to show"));
    }
}
