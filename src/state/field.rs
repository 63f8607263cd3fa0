//! Observable field identifiers and change sets.
//!
//! Effects declare the fields they read as a [`FieldSet`]; every action
//! records the fields it changed, and the store runs each effect at most
//! once per batch when the two sets intersect.

/// A field of [`SleuthState`](super::SleuthState) that effects can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Field {
    /// Active source path.
    Source,
    /// Selected log file.
    SelectedLogFile,
    /// Selected entry.
    SelectedEntry,
    /// Level filter flags.
    LevelFilter,
    /// Search text.
    Search,
    /// Search match cursor.
    SearchIndex,
    /// Hide non-matching rows.
    ShowOnlySearchResults,
    /// Date range bounds.
    DateRange,
    /// Suggestion list.
    Suggestions,
    /// Sidebar visibility.
    IsSidebarOpen,
    /// Spotlight visibility.
    IsSpotlightOpen,
    /// Details pane visibility.
    IsDetailsVisible,
    /// Search box visibility.
    IsSearchVisible,
    /// Timestamp display pattern.
    DateTimeFormat,
    /// UI font.
    Font,
    /// Auto-open preference.
    IsOpenMostRecent,
    /// Editor command template.
    DefaultEditor,
    /// Sort direction.
    DefaultSort,
    /// Dark mode.
    IsDarkMode,
    /// Icon style.
    IsMarkIcon,
    /// Cache directory under inspection.
    CachePath,
    /// Enumerated cache keys.
    CacheKeys,
    /// Selected cache key.
    SelectedCacheKey,
    /// Cache enumeration in flight.
    IsLoadingCacheKeys,
}

impl Field {
    const fn bit(self) -> u32 {
        1 << (self as u8)
    }
}

/// A set of [`Field`]s backed by a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldSet(u32);

impl FieldSet {
    /// The empty set.
    pub const EMPTY: FieldSet = FieldSet(0);

    /// Build a set from a list of fields. Usable in `const` context.
    pub const fn of(fields: &[Field]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < fields.len() {
            bits |= fields[i].bit();
            i += 1;
        }
        FieldSet(bits)
    }

    /// Add a field.
    pub fn insert(&mut self, field: Field) {
        self.0 |= field.bit();
    }

    /// Check membership.
    pub fn contains(&self, field: Field) -> bool {
        self.0 & field.bit() != 0
    }

    /// Whether the sets share any field.
    pub fn intersects(&self, other: FieldSet) -> bool {
        self.0 & other.0 != 0
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Move the contents out, leaving the set empty.
    pub fn take(&mut self) -> FieldSet {
        std::mem::take(self)
    }
}
