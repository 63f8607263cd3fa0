//! Screen layout.
//!
//! Pure layout logic: computes the areas for each pane from the terminal
//! size and the visibility flags in the store.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the suggestions sidebar.
pub const SIDEBAR_WIDTH: u16 = 32;

/// Percentage of the content width given to the details pane.
pub const DETAILS_PERCENT: u16 = 40;

/// Which optional panes are showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaneFlags {
    /// Suggestions sidebar.
    pub sidebar: bool,
    /// Details pane.
    pub details: bool,
    /// Caution banner above the table.
    pub banner: bool,
}

/// Areas for one frame. Hidden panes have no area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    /// Filter bar or search input (1 line).
    pub header: Rect,
    /// Caution banner (1 line).
    pub banner: Option<Rect>,
    /// Suggestions sidebar.
    pub sidebar: Option<Rect>,
    /// Log table, including its column header line.
    pub table: Rect,
    /// Details pane.
    pub details: Option<Rect>,
    /// Status bar (1 line).
    pub status: Rect,
}

impl AppLayout {
    /// Rows of the table available for entries (minus the column header).
    pub fn table_body_height(&self) -> u16 {
        self.table.height.saturating_sub(1)
    }

    /// Row of the filtered view under a screen position, if it is inside
    /// the table body.
    pub fn table_row_at(&self, column: u16, row: u16, scroll_top: usize) -> Option<usize> {
        let body_top = self.table.y + 1;
        let inside = column >= self.table.x
            && column < self.table.x + self.table.width
            && row >= body_top
            && row < self.table.y + self.table.height;
        inside.then(|| scroll_top + (row - body_top) as usize)
    }
}

/// Compute the layout for a frame.
pub fn compute_layout(area: Rect, flags: PaneFlags) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                                  // Header
            Constraint::Length(if flags.banner { 1 } else { 0 }), // Banner
            Constraint::Min(0),                                     // Content
            Constraint::Length(1),                                  // Status
        ])
        .split(area);

    let (header, banner, content, status) = (vertical[0], vertical[1], vertical[2], vertical[3]);

    let (sidebar, main) = if flags.sidebar {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(content);
        (Some(chunks[0]), chunks[1])
    } else {
        (None, content)
    };

    let (table, details) = if flags.details {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(100 - DETAILS_PERCENT),
                Constraint::Percentage(DETAILS_PERCENT),
            ])
            .split(main);
        (chunks[0], Some(chunks[1]))
    } else {
        (main, None)
    };

    AppLayout {
        header,
        banner: flags.banner.then_some(banner),
        sidebar,
        table,
        details,
        status,
    }
}

/// A `width` x `height` box centred in `area`, shrunk to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Rect {
        Rect::new(0, 0, 120, 40)
    }

    #[test]
    fn bare_layout_gives_table_everything_but_bars() {
        let layout = compute_layout(screen(), PaneFlags::default());
        assert_eq!(layout.table, Rect::new(0, 1, 120, 38));
        assert!(layout.banner.is_none());
        assert!(layout.sidebar.is_none());
        assert!(layout.details.is_none());
        assert_eq!(layout.table_body_height(), 37);
    }

    #[test]
    fn banner_takes_one_line() {
        let layout = compute_layout(
            screen(),
            PaneFlags {
                banner: true,
                ..PaneFlags::default()
            },
        );
        assert_eq!(layout.banner, Some(Rect::new(0, 1, 120, 1)));
        assert_eq!(layout.table.y, 2);
    }

    #[test]
    fn sidebar_and_details_split_horizontally() {
        let layout = compute_layout(
            screen(),
            PaneFlags {
                sidebar: true,
                details: true,
                banner: false,
            },
        );
        let sidebar = layout.sidebar.expect("sidebar");
        let details = layout.details.expect("details");
        assert_eq!(sidebar.width, SIDEBAR_WIDTH);
        assert_eq!(layout.table.x, SIDEBAR_WIDTH);
        assert_eq!(layout.table.width + details.width, 120 - SIDEBAR_WIDTH);
    }

    #[test]
    fn table_row_hit_testing() {
        let layout = compute_layout(screen(), PaneFlags::default());
        assert_eq!(layout.table_row_at(5, 1, 0), None, "column header is not a row");
        assert_eq!(layout.table_row_at(5, 2, 0), Some(0));
        assert_eq!(layout.table_row_at(5, 4, 100), Some(102));
        assert_eq!(layout.table_row_at(5, 39, 0), None, "status bar");
    }

    #[test]
    fn centered_rect_fits_inside_area() {
        assert_eq!(centered_rect(screen(), 60, 10), Rect::new(30, 15, 60, 10));
        assert_eq!(centered_rect(Rect::new(0, 0, 20, 5), 60, 10), Rect::new(0, 0, 20, 5));
    }
}
