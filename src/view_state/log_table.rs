//! Virtualised log table: windowing, row projection and row clicks.
//!
//! The table receives an already filtered and sorted [`FilteredView`] and
//! only ever materialises the rows inside the [`VisibleRange`] window.

use super::pipeline::FilteredView;
use super::types::{RowIndex, ViewportDimensions};
use super::visible_range::VisibleRange;
use crate::model::{LogFile, LogLevel, LogType};
use crate::prefs::DateTimeFormat;

/// Rows rendered beyond each edge of the viewport.
pub const DEFAULT_OVERSCAN_ROWS: usize = 500;

/// Fixed width of the timestamp column, glyph included.
pub const TIMESTAMP_COLUMN_WIDTH: u16 = 24;

/// Fixed width of the level column.
pub const LEVEL_COLUMN_WIDTH: u16 = 9;

/// Banner shown above best-effort sources.
pub const CAUTION_TEXT: &str =
    "The web app logs are difficult to parse for a computer - proceed with caution.";

// ===== LogTableState =====

/// Scroll position and viewport of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTableState {
    scroll_top: usize,
    viewport: ViewportDimensions,
    overscan: usize,
}

impl Default for LogTableState {
    fn default() -> Self {
        Self::new(DEFAULT_OVERSCAN_ROWS)
    }
}

impl LogTableState {
    /// Create a table scrolled to the top.
    pub fn new(overscan: usize) -> Self {
        Self {
            scroll_top: 0,
            viewport: ViewportDimensions::default(),
            overscan,
        }
    }

    /// First row in the viewport.
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// Current viewport.
    pub fn viewport(&self) -> ViewportDimensions {
        self.viewport
    }

    /// Overscan margin in rows.
    pub fn overscan(&self) -> usize {
        self.overscan
    }

    /// Scroll event: jump to an absolute row.
    pub fn on_scroll(&mut self, scroll_top: usize, total_rows: usize) {
        self.scroll_top = scroll_top.min(self.max_scroll(total_rows));
    }

    /// Scroll by a signed number of rows.
    pub fn scroll_by(&mut self, delta: isize, total_rows: usize) {
        let target = self.scroll_top.saturating_add_signed(delta);
        self.on_scroll(target, total_rows);
    }

    /// Resize event.
    pub fn on_resize(&mut self, viewport: ViewportDimensions, total_rows: usize) {
        self.viewport = viewport;
        self.on_scroll(self.scroll_top, total_rows);
    }

    /// Scroll the minimum amount needed to bring `row` into view.
    pub fn ensure_visible(&mut self, row: usize, total_rows: usize) {
        let height = (self.viewport.height as usize).max(1);
        if row < self.scroll_top {
            self.on_scroll(row, total_rows);
        } else if row >= self.scroll_top + height {
            self.on_scroll(row + 1 - height, total_rows);
        }
    }

    /// Window of rows to materialise. Recomputed on every call; it is
    /// plain arithmetic.
    pub fn window(&self, total_rows: usize) -> VisibleRange {
        VisibleRange::compute(total_rows, self.scroll_top, self.viewport.height, self.overscan)
    }

    fn max_scroll(&self, total_rows: usize) -> usize {
        total_rows.saturating_sub(self.viewport.height as usize)
    }
}

// ===== Cells =====

/// Provenance glyph in the timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvenanceGlyph {
    /// Browser process.
    Browser,
    /// Renderer process.
    Renderer,
    /// Web app.
    Webapp,
    /// Webview.
    Webview,
    /// Anything else.
    Generic,
}

impl ProvenanceGlyph {
    /// Glyph for an entry's log type.
    pub fn for_log_type(log_type: LogType) -> Self {
        match log_type {
            LogType::Browser => ProvenanceGlyph::Browser,
            LogType::Renderer => ProvenanceGlyph::Renderer,
            LogType::Webapp => ProvenanceGlyph::Webapp,
            LogType::Webview => ProvenanceGlyph::Webview,
            LogType::Unknown => ProvenanceGlyph::Generic,
        }
    }

    /// Single-cell symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            ProvenanceGlyph::Browser => "⏻",
            ProvenanceGlyph::Renderer => "▭",
            ProvenanceGlyph::Webapp => "◍",
            ProvenanceGlyph::Webview => "▤",
            ProvenanceGlyph::Generic => "?",
        }
    }

    /// Hover/accessibility title.
    pub fn title(&self) -> &'static str {
        match self {
            ProvenanceGlyph::Browser => "Browser Log",
            ProvenanceGlyph::Renderer => "Renderer Log",
            ProvenanceGlyph::Webapp => "Webapp Log",
            ProvenanceGlyph::Webview => "Webview Log",
            ProvenanceGlyph::Generic => "Unknown Log",
        }
    }
}

/// Glyph prefixed to messages of entries that carry metadata.
pub const HAS_META_GLYPH: &str = "▣";

/// One materialised table row. Borrows from the log file.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow<'a> {
    /// Row position in the filtered view.
    pub row: RowIndex,
    /// Index of the entry in its file.
    pub entry_index: usize,
    /// Provenance glyph.
    pub glyph: ProvenanceGlyph,
    /// Displayed timestamp: the formatted instant, or the raw text.
    pub timestamp: String,
    /// Raw timestamp, always kept for hover/accessibility.
    pub timestamp_label: &'a str,
    /// Level column.
    pub level: LogLevel,
    /// Message column.
    pub message: &'a str,
    /// Whether the message gets the metadata glyph.
    pub has_meta: bool,
    /// Whether the row matches the active search.
    pub is_search_match: bool,
    /// Whether the row holds the selected entry.
    pub is_selected: bool,
}

/// Build rows for the given window only.
pub fn project_rows<'a>(
    file: &'a LogFile,
    view: &FilteredView,
    range: &VisibleRange,
    format: &DateTimeFormat,
    selected_entry: Option<usize>,
) -> Vec<TableRow<'a>> {
    range
        .indices()
        .filter_map(|row| {
            let entry_index = view.entry_index(row.get())?;
            let entry = file.entry(entry_index)?;
            let timestamp = match entry.moment() {
                Some(moment) => format.format(&moment),
                None => entry.timestamp().to_string(),
            };
            Some(TableRow {
                row,
                entry_index,
                glyph: ProvenanceGlyph::for_log_type(entry.log_type()),
                timestamp,
                timestamp_label: entry.timestamp(),
                level: entry.level(),
                message: entry.message(),
                has_meta: entry.has_meta(),
                is_search_match: view.search_matches().binary_search(&row.get()).is_ok(),
                is_selected: selected_entry == Some(entry_index),
            })
        })
        .collect()
}

/// Caution banner for the file, if its provenance is best-effort.
pub fn caution_banner(file: &LogFile) -> Option<&'static str> {
    file.log_type().is_best_effort().then_some(CAUTION_TEXT)
}

// ===== Row clicks =====

/// Outcome of clicking a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowClick {
    /// Entry to select.
    pub entry_index: usize,
    /// Whether the detail pane should be shown.
    pub reveal_details: bool,
}

/// Resolve a click on `row`. Clicks with no backing entry resolve to `None`.
pub fn resolve_row_click(file: &LogFile, view: &FilteredView, row: usize) -> Option<RowClick> {
    let entry_index = view.entry_index(row)?;
    let entry = file.entry(entry_index)?;
    Some(RowClick {
        entry_index,
        reveal_details: entry.has_meta(),
    })
}
