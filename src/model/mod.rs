//! Domain model types (pure).
//!
//! Entries and files are immutable once built; view state only hides or
//! selects around them.

pub mod error;
pub mod filter;
pub mod log_entry;
pub mod log_file;
pub mod suggestion;

// Re-export for convenience
pub use error::{AppError, CacheKeyError, EditorError, PreferenceError, ScanError, SourceError};
pub use filter::{DateRange, FilterLevel, LevelFilter, UnknownFilterLevel};
pub use log_entry::{LogEntry, LogLevel, LogType};
pub use log_file::{LogFile, LogFileKind};
pub use suggestion::{Suggestion, most_recent};
