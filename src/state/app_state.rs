//! Application state and transitions.
//!
//! SleuthState is the single store for the process. Actions mutate fields
//! synchronously inside a batch; when the outermost batch closes, every
//! effect whose declared dependencies changed runs exactly once against the
//! final values. Asynchronous collaborators are reached through queued
//! [`Command`]s and report back through `receive_*`.

use super::command::{Command, Notification, normalize_cache_keys};
use super::effects::Effect;
use super::field::{Field, FieldSet};
use super::host::{Callbacks, Host, HostClass, IconName};
use crate::model::{
    CacheKeyError, DateRange, FilterLevel, LevelFilter, LogFile, ScanError, Suggestion,
    most_recent,
};
use crate::prefs::{
    DateTimeFormat, EditorCommand, PrefValue, PreferenceKey, PreferenceStore, Preferences,
    SortDirection,
};
use crate::view_state::log_table::resolve_row_click;
use crate::view_state::pipeline::{FilteredView, ViewPredicates};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Upper bound on effect rounds per flush. Effects that write fields other
/// effects observe settle in two rounds; anything beyond this is a cycle.
const MAX_EFFECT_ROUNDS: usize = 8;

/// Fields the filtered view depends on.
const VIEW_DEPS: FieldSet = FieldSet::of(&[
    Field::SelectedLogFile,
    Field::LevelFilter,
    Field::Search,
    Field::ShowOnlySearchResults,
    Field::DateRange,
    Field::DefaultSort,
]);

/// Whether the external cache format can be inspected on this platform.
pub fn cache_inspection_supported() -> bool {
    cfg!(target_os = "macos")
}

// ===== StateOptions =====

/// Construction-time switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateOptions {
    /// Register the cache-key enumeration effect.
    pub cache_inspection: bool,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            cache_inspection: cache_inspection_supported(),
        }
    }
}

// ===== SleuthState =====

/// The application store.
///
/// Session-scoped fields (selection, filters, search, cache inspection) are
/// cleared by [`reset`](Self::reset); preferences survive for the life of
/// the process and are mirrored into the [`PreferenceStore`] by effects.
pub struct SleuthState {
    // Session
    source: Option<PathBuf>,
    selected_log_file: Option<Arc<LogFile>>,
    selected_entry: Option<usize>,
    level_filter: LevelFilter,
    search: String,
    search_index: usize,
    show_only_search_results: bool,
    date_range: DateRange,
    suggestions: Vec<Suggestion>,

    // UI visibility
    is_sidebar_open: bool,
    is_spotlight_open: bool,
    is_details_visible: bool,
    is_search_visible: bool,

    // Persisted
    prefs: Preferences,

    // Cache inspection
    cache_path: Option<PathBuf>,
    cache_keys: Vec<String>,
    selected_cache_key: Option<String>,
    is_loading_cache_keys: bool,
    cache_generation: u64,

    // Process lifetime
    has_auto_opened: bool,

    // Plumbing
    store: PreferenceStore,
    host: Box<dyn Host>,
    callbacks: Callbacks,
    effects: Vec<Effect>,
    changed: FieldSet,
    batch_depth: usize,
    commands: Vec<Command>,
    notifications: Vec<Notification>,
    view_cache: Option<FilteredView>,
}

impl std::fmt::Debug for SleuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SleuthState")
            .field("source", &self.source)
            .field("selected_entry", &self.selected_entry)
            .field("level_filter", &self.level_filter)
            .field("search", &self.search)
            .field("search_index", &self.search_index)
            .field("date_range", &self.date_range)
            .field("prefs", &self.prefs)
            .field("cache_path", &self.cache_path)
            .field("is_loading_cache_keys", &self.is_loading_cache_keys)
            .finish_non_exhaustive()
    }
}

impl SleuthState {
    /// Build the store, hydrate preferences, run every effect once and
    /// queue the initial suggestion scan.
    pub fn new(
        store: PreferenceStore,
        host: Box<dyn Host>,
        callbacks: Callbacks,
        options: StateOptions,
    ) -> Self {
        let prefs = Preferences::hydrate(&store);
        let effects = Effect::registered(options.cache_inspection);
        debug!(?effects, "Registering effects");

        let mut state = Self {
            source: None,
            selected_log_file: None,
            selected_entry: None,
            level_filter: LevelFilter::default(),
            search: String::new(),
            search_index: 0,
            show_only_search_results: false,
            date_range: DateRange::unbounded(),
            suggestions: Vec::new(),
            is_sidebar_open: true,
            is_spotlight_open: false,
            is_details_visible: false,
            is_search_visible: false,
            prefs,
            cache_path: None,
            cache_keys: Vec::new(),
            selected_cache_key: None,
            is_loading_cache_keys: false,
            cache_generation: 0,
            has_auto_opened: false,
            store,
            host,
            callbacks,
            effects,
            changed: FieldSet::EMPTY,
            batch_depth: 0,
            commands: Vec::new(),
            notifications: Vec::new(),
            view_cache: None,
        };

        // Effects run once up front, the way an autorun would.
        for effect in state.effects.clone() {
            state.run_effect(effect);
        }
        state.flush();

        state.get_suggestions();
        state
    }

    // ===== Batching =====

    /// Run several mutations as one batch. Effects observe only the final
    /// values once the outermost batch closes.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.batch_depth += 1;
        let result = f(self);
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            self.flush();
        }
        result
    }

    fn mark(&mut self, field: Field) {
        self.changed.insert(field);
    }

    fn flush(&mut self) {
        let mut rounds = 0;
        while !self.changed.is_empty() {
            rounds += 1;
            if rounds > MAX_EFFECT_ROUNDS {
                warn!("Effects did not settle; dropping remaining changes");
                self.changed = FieldSet::EMPTY;
                break;
            }

            let changed = self.changed.take();
            if changed.intersects(VIEW_DEPS) {
                self.view_cache = None;
            }
            for effect in self.effects.clone() {
                if changed.intersects(effect.deps()) {
                    self.run_effect(effect);
                }
            }
        }
    }

    // ===== Effects =====

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::PersistPreferences => {
                let prefs = &self.prefs;
                let writes: [(PreferenceKey, PrefValue); 5] = [
                    (PreferenceKey::DateTimeFormat, prefs.date_time_format.pattern().into()),
                    (PreferenceKey::Font, prefs.font.clone().into()),
                    (PreferenceKey::IsOpenMostRecent, prefs.is_open_most_recent.into()),
                    (PreferenceKey::DefaultEditor, prefs.default_editor.as_str().into()),
                    (PreferenceKey::DefaultSort, prefs.default_sort.as_str().into()),
                ];
                for (key, value) in writes {
                    self.persist(key, value);
                }
            }
            Effect::DarkMode => {
                let dark = self.prefs.is_dark_mode;
                self.persist(PreferenceKey::IsDarkMode, dark.into());
                self.host.set_presentation_class(HostClass::Dark, dark);
            }
            Effect::Sidebar => {
                self.host
                    .set_presentation_class(HostClass::SidebarOpen, self.is_sidebar_open);
            }
            Effect::Icon => {
                self.persist(PreferenceKey::IsMarkIcon, self.prefs.is_mark_icon.into());
                let icon = self.get_icon_path();
                self.host.set_icon(icon);
            }
            Effect::CacheKeys => self.start_cache_enumeration(),
        }
    }

    fn persist(&mut self, key: PreferenceKey, value: PrefValue) {
        if let Err(e) = self.store.save(key, value) {
            warn!(key = %key, error = %e, "Failed to persist preference");
        }
    }

    fn start_cache_enumeration(&mut self) {
        // Every change supersedes whatever request is still in flight.
        self.cache_generation += 1;

        let Some(cache_path) = self.cache_path.clone() else {
            self.set_loading_cache_keys(false);
            return;
        };

        self.set_loading_cache_keys(true);
        info!(path = %cache_path.display(), generation = self.cache_generation, "Enumerating cache keys");
        self.commands.push(Command::ListCacheKeys {
            generation: self.cache_generation,
            cache_path,
        });
    }

    fn set_loading_cache_keys(&mut self, loading: bool) {
        if self.is_loading_cache_keys != loading {
            self.is_loading_cache_keys = loading;
            self.mark(Field::IsLoadingCacheKeys);
        }
    }

    // ===== Source & selection =====

    /// Record the active source path.
    pub fn set_source(&mut self, source: Option<PathBuf>) {
        self.batch(|s| {
            if s.source != source {
                s.source = source;
                s.mark(Field::Source);
            }
        });
    }

    /// Select a log file. Clears the entry selection.
    pub fn select_log_file(&mut self, file: Option<Arc<LogFile>>) {
        self.batch(|s| {
            let same = match (&s.selected_log_file, &file) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            };
            if same {
                return;
            }
            s.selected_log_file = file;
            s.mark(Field::SelectedLogFile);
            s.set_selected_entry(None);
        });
    }

    /// Select an entry by index into the selected file.
    pub fn select_entry(&mut self, entry_index: Option<usize>) {
        self.batch(|s| s.set_selected_entry(entry_index));
    }

    fn set_selected_entry(&mut self, entry_index: Option<usize>) {
        let valid = match (entry_index, &self.selected_log_file) {
            (None, _) => None,
            (Some(i), Some(file)) if i < file.len() => Some(i),
            (Some(i), _) => {
                debug!(index = i, "Ignoring selection without a backing entry");
                return;
            }
        };
        if self.selected_entry != valid {
            self.selected_entry = valid;
            self.mark(Field::SelectedEntry);
        }
    }

    /// Row click: select the entry shown at `row` of the filtered view and
    /// show the detail pane only when it carries metadata. A row with no
    /// backing entry changes nothing.
    pub fn click_row(&mut self, row: usize) {
        let Some(file) = self.selected_log_file.clone() else {
            debug!(row, "Row click without a selected file");
            return;
        };
        let Some(click) = resolve_row_click(&file, self.filtered_view(), row) else {
            debug!(row, "Row click without a backing entry");
            return;
        };
        self.batch(|s| {
            s.set_selected_entry(Some(click.entry_index));
            s.set_details_visible(click.reveal_details);
        });
    }

    // ===== Filters & search =====

    /// Flip one level's hidden flag.
    pub fn toggle_level_filter(&mut self, level: FilterLevel) {
        self.batch(|s| {
            s.level_filter.toggle(level);
            s.mark(Field::LevelFilter);
        });
    }

    /// Replace the whole level filter.
    pub fn set_level_filter(&mut self, filter: LevelFilter) {
        self.batch(|s| {
            if s.level_filter != filter {
                s.level_filter = filter;
                s.mark(Field::LevelFilter);
            }
        });
    }

    /// Set the search text. Moves the match cursor back to the first match.
    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        self.batch(|s| {
            if s.search != search {
                s.search = search;
                s.mark(Field::Search);
                s.set_search_index(0);
            }
        });
    }

    fn set_search_index(&mut self, index: usize) {
        if self.search_index != index {
            self.search_index = index;
            self.mark(Field::SearchIndex);
        }
    }

    /// Advance the match cursor, wrapping at the end.
    pub fn next_search_result(&mut self) {
        let count = self.filtered_view().search_matches().len();
        if count == 0 {
            return;
        }
        let next = (self.search_index.min(count - 1) + 1) % count;
        self.batch(|s| s.set_search_index(next));
    }

    /// Move the match cursor back, wrapping at the start.
    pub fn previous_search_result(&mut self) {
        let count = self.filtered_view().search_matches().len();
        if count == 0 {
            return;
        }
        let current = self.search_index.min(count - 1);
        let prev = if current == 0 { count - 1 } else { current - 1 };
        self.batch(|s| s.set_search_index(prev));
    }

    /// Row of the current search match, if any.
    pub fn current_search_row(&mut self) -> Option<usize> {
        let index = self.search_index;
        let matches = self.filtered_view().search_matches();
        matches.get(index.min(matches.len().checked_sub(1)?)).copied()
    }

    /// Hide or show rows that do not match the search.
    pub fn set_show_only_search_results(&mut self, only: bool) {
        self.batch(|s| {
            if s.show_only_search_results != only {
                s.show_only_search_results = only;
                s.mark(Field::ShowOnlySearchResults);
            }
        });
    }

    /// Flip [`show_only_search_results`](Self::show_only_search_results).
    pub fn toggle_show_only_search_results(&mut self) {
        let only = !self.show_only_search_results;
        self.set_show_only_search_results(only);
    }

    /// Bound the visible time window.
    pub fn set_date_range(&mut self, range: DateRange) {
        self.batch(|s| {
            if s.date_range != range {
                s.date_range = range;
                s.mark(Field::DateRange);
            }
        });
    }

    // ===== Filtered view =====

    fn predicates(&self) -> ViewPredicates {
        ViewPredicates {
            level_filter: self.level_filter,
            needle: ViewPredicates::needle_from(&self.search),
            show_only_search_results: self.show_only_search_results,
            date_range: self.date_range,
            sort: self.prefs.default_sort,
        }
    }

    /// Rows of the selected file under the active predicates.
    ///
    /// Memoised: recomputed only after a field it depends on changed.
    pub fn filtered_view(&mut self) -> &FilteredView {
        if self.view_cache.is_none() {
            let view = match &self.selected_log_file {
                Some(file) => FilteredView::compute(file, &self.predicates()),
                None => FilteredView::default(),
            };
            debug!(rows = view.len(), matches = view.search_matches().len(), "Filtered view recomputed");
            self.view_cache = Some(view);
        }
        self.view_cache.get_or_insert_with(FilteredView::default)
    }

    // ===== UI visibility =====

    /// Flip dark mode.
    pub fn toggle_dark_mode(&mut self) {
        self.batch(|s| {
            s.prefs.is_dark_mode = !s.prefs.is_dark_mode;
            s.mark(Field::IsDarkMode);
        });
    }

    /// Flip the sidebar.
    pub fn toggle_sidebar(&mut self) {
        self.batch(|s| {
            s.is_sidebar_open = !s.is_sidebar_open;
            s.mark(Field::IsSidebarOpen);
        });
    }

    /// Flip the spotlight.
    pub fn toggle_spotlight(&mut self) {
        self.batch(|s| {
            s.is_spotlight_open = !s.is_spotlight_open;
            s.mark(Field::IsSpotlightOpen);
        });
    }

    /// Show or hide the detail pane.
    pub fn set_details_visible(&mut self, visible: bool) {
        self.batch(|s| {
            if s.is_details_visible != visible {
                s.is_details_visible = visible;
                s.mark(Field::IsDetailsVisible);
            }
        });
    }

    /// Flip the detail pane.
    pub fn toggle_details(&mut self) {
        let visible = !self.is_details_visible;
        self.set_details_visible(visible);
    }

    /// Show or hide the search box.
    pub fn set_search_visible(&mut self, visible: bool) {
        self.batch(|s| {
            if s.is_search_visible != visible {
                s.is_search_visible = visible;
                s.mark(Field::IsSearchVisible);
            }
        });
    }

    // ===== Preferences =====

    /// Change the timestamp display pattern.
    pub fn set_date_time_format(&mut self, format: DateTimeFormat) {
        self.batch(|s| {
            if s.prefs.date_time_format != format {
                s.prefs.date_time_format = format;
                s.mark(Field::DateTimeFormat);
            }
        });
    }

    /// Change the UI font.
    pub fn set_font(&mut self, font: impl Into<String>) {
        let font = font.into();
        self.batch(|s| {
            if s.prefs.font != font {
                s.prefs.font = font;
                s.mark(Field::Font);
            }
        });
    }

    /// Enable or disable opening the most recent suggestion on launch.
    pub fn set_open_most_recent(&mut self, enabled: bool) {
        self.batch(|s| {
            if s.prefs.is_open_most_recent != enabled {
                s.prefs.is_open_most_recent = enabled;
                s.mark(Field::IsOpenMostRecent);
            }
        });
    }

    /// Change the editor command template.
    pub fn set_default_editor(&mut self, editor: EditorCommand) {
        self.batch(|s| {
            if s.prefs.default_editor != editor {
                s.prefs.default_editor = editor;
                s.mark(Field::DefaultEditor);
            }
        });
    }

    /// Change the default sort direction.
    pub fn set_default_sort(&mut self, sort: SortDirection) {
        self.batch(|s| {
            if s.prefs.default_sort != sort {
                s.prefs.default_sort = sort;
                s.mark(Field::DefaultSort);
            }
        });
    }

    /// Choose the icon style.
    pub fn set_mark_icon(&mut self, mark: bool) {
        self.batch(|s| {
            if s.prefs.is_mark_icon != mark {
                s.prefs.is_mark_icon = mark;
                s.mark(Field::IsMarkIcon);
            }
        });
    }

    /// Icon identifier for the current icon style.
    pub fn get_icon_path(&self) -> IconName {
        if self.prefs.is_mark_icon {
            IconName::Mark
        } else {
            IconName::Classic
        }
    }

    // ===== Cache inspection =====

    /// Point cache inspection at a directory, or stop inspecting.
    pub fn set_cache_path(&mut self, path: Option<PathBuf>) {
        self.batch(|s| {
            if s.cache_path != path {
                s.cache_path = path;
                s.mark(Field::CachePath);
            }
        });
    }

    /// Select one of the enumerated cache keys.
    pub fn select_cache_key(&mut self, key: Option<String>) {
        self.batch(|s| {
            if s.selected_cache_key != key {
                s.selected_cache_key = key;
                s.mark(Field::SelectedCacheKey);
            }
        });
    }

    /// Deliver the result of a [`Command::ListCacheKeys`].
    ///
    /// Results of superseded requests are discarded. A failure keeps the
    /// previous keys, clears the loading flag and queues a notification.
    pub fn receive_cache_keys(&mut self, generation: u64, result: Result<Vec<String>, CacheKeyError>) {
        if generation != self.cache_generation {
            debug!(generation, current = self.cache_generation, "Discarding stale cache keys");
            return;
        }

        self.batch(|s| {
            match result {
                Ok(keys) => {
                    let keys = normalize_cache_keys(keys);
                    info!(count = keys.len(), "Cache keys enumerated");
                    s.cache_keys = keys;
                    s.mark(Field::CacheKeys);
                }
                Err(e) => {
                    warn!(error = %e, "Cache key enumeration failed");
                    s.notifications
                        .push(Notification::warning(format!("Could not list cache keys: {e}")));
                }
            }
            s.set_loading_cache_keys(false);
        });
    }

    // ===== Suggestions =====

    /// Queue a suggestion scan. Each completed scan fully replaces the list.
    pub fn get_suggestions(&mut self) {
        if !self.commands.contains(&Command::ScanSuggestions) {
            self.commands.push(Command::ScanSuggestions);
        }
    }

    /// Deliver the result of a [`Command::ScanSuggestions`], then evaluate
    /// auto-open. A failed scan keeps the previous list.
    pub fn receive_suggestions(&mut self, result: Result<Vec<Suggestion>, ScanError>) {
        match result {
            Ok(suggestions) => {
                debug!(count = suggestions.len(), "Suggestions replaced");
                self.batch(|s| {
                    s.suggestions = suggestions;
                    s.mark(Field::Suggestions);
                });
                self.open_most_recent_suggestion_maybe();
            }
            Err(e) => {
                warn!(error = %e, "Suggestion scan failed");
                self.notifications
                    .push(Notification::warning(format!("Could not scan for logs: {e}")));
            }
        }
    }

    /// Open the newest suggestion, once per process, if the preference is on.
    pub fn open_most_recent_suggestion_maybe(&mut self) {
        if !self.prefs.is_open_most_recent || self.has_auto_opened {
            return;
        }
        let Some(path) = most_recent(&self.suggestions).map(|s| s.file_path.clone()) else {
            return;
        };

        self.has_auto_opened = true;
        info!(path = %path.display(), "Opening most recent suggestion");
        (self.callbacks.open_file)(&path);
    }

    // ===== Reset =====

    /// Clear session state between files. Preferences are retained.
    /// With `go_back_to_home`, also notify the shell to show the home view.
    pub fn reset(&mut self, go_back_to_home: bool) {
        self.batch(|s| {
            s.set_selected_entry(None);
            if s.selected_log_file.take().is_some() {
                s.mark(Field::SelectedLogFile);
            }
            if !s.level_filter.is_empty() {
                s.level_filter.clear();
                s.mark(Field::LevelFilter);
            }
            s.set_search_index(0);
            s.set_show_only_search_results(false);
            if s.is_spotlight_open {
                s.is_spotlight_open = false;
                s.mark(Field::IsSpotlightOpen);
            }
            s.set_details_visible(false);
            s.set_date_range(DateRange::unbounded());

            if !s.cache_keys.is_empty() {
                s.cache_keys.clear();
                s.mark(Field::CacheKeys);
            }
            s.set_cache_path(None);
            s.select_cache_key(None);
            s.set_loading_cache_keys(false);
        });

        if go_back_to_home {
            (self.callbacks.reset_app)();
        }
    }

    // ===== Shell plumbing =====

    /// Take the queued commands for the runtime to execute.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Take queued user-visible notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Backing preference store.
    pub fn preference_store(&self) -> &PreferenceStore {
        &self.store
    }

    // ===== Accessors =====

    /// Active source path.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Selected file.
    pub fn selected_log_file(&self) -> Option<&Arc<LogFile>> {
        self.selected_log_file.as_ref()
    }

    /// Index of the selected entry in the selected file.
    pub fn selected_entry_index(&self) -> Option<usize> {
        self.selected_entry
    }

    /// The selected entry itself.
    pub fn selected_entry(&self) -> Option<&crate::model::LogEntry> {
        let file = self.selected_log_file.as_ref()?;
        file.entry(self.selected_entry?)
    }

    /// Level filter.
    pub fn level_filter(&self) -> &LevelFilter {
        &self.level_filter
    }

    /// Search text.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Match cursor.
    pub fn search_index(&self) -> usize {
        self.search_index
    }

    /// Whether non-matching rows are hidden.
    pub fn show_only_search_results(&self) -> bool {
        self.show_only_search_results
    }

    /// Date range.
    pub fn date_range(&self) -> &DateRange {
        &self.date_range
    }

    /// Suggestions from the last successful scan.
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Sidebar visibility.
    pub fn is_sidebar_open(&self) -> bool {
        self.is_sidebar_open
    }

    /// Spotlight visibility.
    pub fn is_spotlight_open(&self) -> bool {
        self.is_spotlight_open
    }

    /// Detail pane visibility.
    pub fn is_details_visible(&self) -> bool {
        self.is_details_visible
    }

    /// Search box visibility.
    pub fn is_search_visible(&self) -> bool {
        self.is_search_visible
    }

    /// Persisted preferences.
    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Cache directory under inspection.
    pub fn cache_path(&self) -> Option<&Path> {
        self.cache_path.as_deref()
    }

    /// Enumerated cache keys.
    pub fn cache_keys(&self) -> &[String] {
        &self.cache_keys
    }

    /// Selected cache key.
    pub fn selected_cache_key(&self) -> Option<&str> {
        self.selected_cache_key.as_deref()
    }

    /// Whether an enumeration is in flight.
    pub fn is_loading_cache_keys(&self) -> bool {
        self.is_loading_cache_keys
    }
}

// ===== Tests =====

#[cfg(test)]
#[path = "app_state_tests.rs"]
mod tests;
