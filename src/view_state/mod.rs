//! View-state layer: filtering pipeline, scrolling, and the virtualized
//! log table.
//!
//! # Module Structure
//!
//! - `types`: Core newtypes (RowIndex, ViewportDimensions)
//! - `pipeline`: FilteredView - level/date/search/sort pass over a file
//! - `visible_range`: VisibleRange - materialised window with overscan
//! - `log_table`: LogTableState, row projection, and row-click resolution

pub mod log_table;
pub mod pipeline;
pub mod types;
pub mod visible_range;

// Re-export for convenience
pub use log_table::{LogTableState, ProvenanceGlyph, RowClick, TableRow};
pub use pipeline::{FilteredView, ViewPredicates};
pub use types::{RowIndex, ViewportDimensions};
pub use visible_range::VisibleRange;
