//! The typed snapshot of every persisted preference.

use super::keys::{DateTimeFormat, EditorCommand, PreferenceKey, SortDirection, default_font};
use super::store::PreferenceStore;

/// Persisted, user-configurable settings.
///
/// `Default` holds the per-field defaults, which are authoritative over the
/// shared key table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    /// Timestamp display pattern.
    pub date_time_format: DateTimeFormat,
    /// UI font family.
    pub font: String,
    /// Open the most recent suggestion on launch.
    pub is_open_most_recent: bool,
    /// Editor command template.
    pub default_editor: EditorCommand,
    /// Default sort direction.
    pub default_sort: SortDirection,
    /// Dark presentation.
    pub is_dark_mode: bool,
    /// Use the "mark" icon.
    pub is_mark_icon: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            date_time_format: DateTimeFormat::default(),
            font: default_font().to_string(),
            is_open_most_recent: false,
            default_editor: EditorCommand::default(),
            default_sort: SortDirection::default(),
            is_dark_mode: true,
            is_mark_icon: true,
        }
    }
}

impl Preferences {
    /// Read every preference, substituting the per-field default for
    /// anything absent or undecodable.
    pub fn hydrate(store: &PreferenceStore) -> Self {
        let defaults = Self::default();

        Self {
            date_time_format: store
                .retrieve_text(PreferenceKey::DateTimeFormat)
                .map(DateTimeFormat::new)
                .unwrap_or(defaults.date_time_format),
            font: store
                .retrieve_text(PreferenceKey::Font)
                .unwrap_or(defaults.font),
            is_open_most_recent: store
                .retrieve_parsed(PreferenceKey::IsOpenMostRecent)
                .unwrap_or(defaults.is_open_most_recent),
            default_editor: store
                .retrieve_text(PreferenceKey::DefaultEditor)
                .map(EditorCommand::new)
                .unwrap_or(defaults.default_editor),
            default_sort: store
                .retrieve_text(PreferenceKey::DefaultSort)
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_sort),
            is_dark_mode: store
                .retrieve_parsed(PreferenceKey::IsDarkMode)
                .unwrap_or(defaults.is_dark_mode),
            is_mark_icon: store
                .retrieve_parsed(PreferenceKey::IsMarkIcon)
                .unwrap_or(defaults.is_mark_icon),
        }
    }
}
