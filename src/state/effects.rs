//! Reactive effects registered on the store.

use super::field::{Field, FieldSet};

/// A side effect re-run whenever a field it depends on changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Mirror the text and auto-open preferences into the store.
    PersistPreferences,
    /// Persist dark mode and toggle the host's dark class.
    DarkMode,
    /// Toggle the host's sidebar class.
    Sidebar,
    /// Persist the icon style and push the icon to the host.
    Icon,
    /// Enumerate cache keys for the current cache path.
    CacheKeys,
}

impl Effect {
    /// Fields this effect reads.
    pub fn deps(&self) -> FieldSet {
        match self {
            Effect::PersistPreferences => FieldSet::of(&[
                Field::DateTimeFormat,
                Field::Font,
                Field::IsOpenMostRecent,
                Field::DefaultEditor,
                Field::DefaultSort,
            ]),
            Effect::DarkMode => FieldSet::of(&[Field::IsDarkMode]),
            Effect::Sidebar => FieldSet::of(&[Field::IsSidebarOpen]),
            Effect::Icon => FieldSet::of(&[Field::IsMarkIcon]),
            Effect::CacheKeys => FieldSet::of(&[Field::CachePath]),
        }
    }

    /// Effects to register, in run order. Cache enumeration is only
    /// registered where the cache format can be inspected.
    pub fn registered(cache_inspection: bool) -> Vec<Effect> {
        let mut effects = vec![
            Effect::PersistPreferences,
            Effect::DarkMode,
            Effect::Sidebar,
            Effect::Icon,
        ];
        if cache_inspection {
            effects.push(Effect::CacheKeys);
        }
        effects
    }
}
