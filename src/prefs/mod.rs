//! Preference store: typed get/set over a durable key-value backend.

pub mod backend;
pub mod keys;
pub mod preferences;
pub mod store;

pub use backend::{JsonFileBackend, KeyValueBackend, MemoryBackend};
pub use keys::{
    DateTimeFormat, EditorCommand, InvalidSortDirection, PreferenceKey, SortDirection,
    UnknownPreferenceKey, default_font,
};
pub use preferences::Preferences;
pub use store::{PrefValue, PreferenceStore};
