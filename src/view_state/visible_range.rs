//! Visible range calculation result

use super::types::RowIndex;

/// Range of rows materialised for the current viewport.
///
/// Covers the rows scrolled into view plus an overscan margin on each side.
/// Rows have uniform height, so the window is plain arithmetic on the
/// scroll offset.
///
/// # Invariants
/// - `start_index <= first_visible <= end_index`
/// - `end_index <= total_rows`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibleRange {
    /// Index of first materialised row (inclusive).
    pub start_index: RowIndex,
    /// Index of last materialised row (exclusive).
    pub end_index: RowIndex,
    /// First row actually inside the viewport.
    pub first_visible: RowIndex,
    /// Viewport height in rows.
    pub viewport_height: u16,
}

impl VisibleRange {
    /// Create new visible range.
    ///
    /// # Panics
    /// In debug builds, panics if start_index > end_index.
    pub fn new(
        start_index: RowIndex,
        end_index: RowIndex,
        first_visible: RowIndex,
        viewport_height: u16,
    ) -> Self {
        debug_assert!(
            start_index <= end_index,
            "start_index {start_index:?} > end_index {end_index:?}"
        );
        Self {
            start_index,
            end_index,
            first_visible,
            viewport_height,
        }
    }

    /// Window for `total_rows` rows scrolled to `scroll_top`, extended by
    /// `overscan` rows on both sides and clamped to the row count.
    pub fn compute(total_rows: usize, scroll_top: usize, viewport_height: u16, overscan: usize) -> Self {
        let first_visible = scroll_top.min(total_rows);
        let last_visible = first_visible
            .saturating_add(viewport_height as usize)
            .min(total_rows);

        let start = first_visible.saturating_sub(overscan);
        let end = last_visible.saturating_add(overscan).min(total_rows);

        Self::new(
            RowIndex::new(start),
            RowIndex::new(end),
            RowIndex::new(first_visible),
            viewport_height,
        )
    }

    /// Number of materialised rows.
    pub fn len(&self) -> usize {
        self.end_index.get() - self.start_index.get()
    }

    /// Check if range is empty.
    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    /// Iterate over materialised row indices.
    pub fn indices(&self) -> impl Iterator<Item = RowIndex> {
        (self.start_index.get()..self.end_index.get()).map(RowIndex::new)
    }

    /// Rows inside the viewport itself, without overscan.
    pub fn viewport_indices(&self) -> impl Iterator<Item = RowIndex> {
        let end = self
            .first_visible
            .get()
            .saturating_add(self.viewport_height as usize)
            .min(self.end_index.get());
        (self.first_visible.get()..end).map(RowIndex::new)
    }

    /// Check if a specific row index is materialised.
    pub fn contains(&self, index: RowIndex) -> bool {
        index >= self.start_index && index < self.end_index
    }
}
