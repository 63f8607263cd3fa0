//! Log input sources and external collaborators.
//!
//! - Entries files: JSON-lines of already parsed entries
//! - Suggestion scanning: candidate sources on disk
//! - Cache tool: key enumeration for cache directories
//! - Editor: opening a source file at an entry's line

pub mod cache_tool;
pub mod editor;
pub mod entries;
pub mod scanner;

pub use cache_tool::{
    CacheKeyLister, CommandCacheKeyLister, cache_dir_for, cache_keys_file, split_keys,
};
pub use editor::launch_editor;
pub use entries::{load_log_file, log_type_from_name, parse_entries};
pub use scanner::{DirectoryScanner, SuggestionScanner};
