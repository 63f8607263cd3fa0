//! Property-based tests for store and model invariants.
//!
//! Tests validate:
//! 1. most_recent picks the strict maximum, earliest on ties
//! 2. Level filter toggles are involutions
//! 3. Preferences round-trip through the store
//! 4. Cache key normalisation drops at most one trailing empty key
//! 5. Hiding a level hides exactly the entries of that level
//! 6. reset() leaves the session in its initial shape from any state
//! 7. Search navigation always lands on a match

use proptest::prelude::*;
use sleuth::model::{
    DateRange, FilterLevel, LevelFilter, LogEntry, LogFile, LogLevel, LogType, Suggestion,
    most_recent,
};
use sleuth::prefs::{MemoryBackend, PreferenceKey, PreferenceStore};
use sleuth::state::{Callbacks, NoopHost, SleuthState, StateOptions, normalize_cache_keys};
use sleuth::view_state::{FilteredView, ViewPredicates};
use std::sync::Arc;

// ===== Strategies =====

fn log_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Error),
        Just(LogLevel::Warning),
        Just(LogLevel::Info),
        Just(LogLevel::Debug),
        Just(LogLevel::Other),
    ]
}

fn filter_level() -> impl Strategy<Value = FilterLevel> {
    prop::sample::select(FilterLevel::ALL.to_vec())
}

fn log_file() -> impl Strategy<Value = LogFile> {
    prop::collection::vec((log_level(), prop::bool::ANY), 0..60).prop_map(|specs| {
        let entries = specs
            .into_iter()
            .enumerate()
            .map(|(i, (level, meta))| {
                let entry = LogEntry::new(format!("t{i}"), level, format!("message {i}"), LogType::Renderer);
                if meta {
                    entry.with_meta(serde_json::json!({ "i": i }))
                } else {
                    entry
                }
            })
            .collect();
        LogFile::processed("renderer.log", LogType::Renderer, entries)
    })
}

#[derive(Debug, Clone)]
enum Action {
    ToggleLevel(FilterLevel),
    Search(String),
    NextResult,
    OnlyResults,
    ClickRow(usize),
    ToggleSpotlight,
    ToggleDetails,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        filter_level().prop_map(Action::ToggleLevel),
        "[a-z0-9 ]{0,6}".prop_map(Action::Search),
        Just(Action::NextResult),
        Just(Action::OnlyResults),
        (0usize..80).prop_map(Action::ClickRow),
        Just(Action::ToggleSpotlight),
        Just(Action::ToggleDetails),
    ]
}

fn store() -> SleuthState {
    SleuthState::new(
        PreferenceStore::new(MemoryBackend::new()),
        Box::new(NoopHost),
        Callbacks::noop(),
        StateOptions {
            cache_inspection: false,
        },
    )
}

fn apply(state: &mut SleuthState, action: &Action) {
    match action {
        Action::ToggleLevel(level) => state.toggle_level_filter(*level),
        Action::Search(text) => state.set_search(text.clone()),
        Action::NextResult => state.next_search_result(),
        Action::OnlyResults => state.toggle_show_only_search_results(),
        Action::ClickRow(row) => state.click_row(*row),
        Action::ToggleSpotlight => state.toggle_spotlight(),
        Action::ToggleDetails => state.toggle_details(),
    }
}

// ===== Property 1: most_recent =====

proptest! {
    #[test]
    fn most_recent_is_first_strict_maximum(mtimes in prop::collection::vec(0i64..5, 0..20)) {
        let suggestions: Vec<Suggestion> = mtimes
            .iter()
            .enumerate()
            .map(|(i, m)| Suggestion::new(format!("/logs/{i}.zip"), *m))
            .collect();

        match most_recent(&suggestions) {
            None => prop_assert!(suggestions.is_empty()),
            Some(picked) => {
                let max = mtimes.iter().copied().max().unwrap_or_default();
                let first = mtimes.iter().position(|m| *m == max).unwrap_or_default();
                prop_assert_eq!(picked, &suggestions[first]);
            }
        }
    }
}

// ===== Property 2: Level filter toggles =====

proptest! {
    #[test]
    fn double_toggle_is_identity(levels in prop::collection::vec(filter_level(), 0..8), level in filter_level()) {
        let mut filter = LevelFilter::default();
        for l in &levels {
            filter.toggle(*l);
        }
        let before = filter;
        filter.toggle(level);
        prop_assert_ne!(filter, before);
        filter.toggle(level);
        prop_assert_eq!(filter, before);
    }
}

// ===== Property 3: Preference round-trip =====

proptest! {
    #[test]
    fn bool_preferences_round_trip(value in prop::bool::ANY) {
        let mut prefs = PreferenceStore::new(MemoryBackend::new());
        prefs.save(PreferenceKey::IsDarkMode, value).expect("save");
        prop_assert_eq!(prefs.retrieve_parsed::<bool>(PreferenceKey::IsDarkMode), Some(value));
    }

    #[test]
    fn text_preferences_round_trip(font in "[A-Za-z ]{1,20}") {
        let mut prefs = PreferenceStore::new(MemoryBackend::new());
        prefs.save(PreferenceKey::Font, font.as_str()).expect("save");
        prop_assert_eq!(prefs.retrieve_text(PreferenceKey::Font), Some(font));
    }
}

// ===== Property 4: Cache key normalisation =====

proptest! {
    #[test]
    fn normalisation_drops_at_most_one_trailing_empty(raw in prop::collection::vec("[a-z]{0,3}", 0..10)) {
        let normalised = normalize_cache_keys(raw.clone());
        let trailing_empty = raw.last().is_some_and(|k| k.is_empty());

        prop_assert_eq!(normalised.len() + usize::from(trailing_empty), raw.len());
        prop_assert_eq!(&normalised[..], &raw[..normalised.len()]);
    }
}

// ===== Property 5: Level filtering =====

proptest! {
    #[test]
    fn hiding_a_level_hides_exactly_that_level(file in log_file(), level in filter_level()) {
        let mut level_filter = LevelFilter::default();
        level_filter.set(level, true);
        let predicates = ViewPredicates {
            level_filter,
            ..ViewPredicates::default()
        };

        let view = FilteredView::compute(&file, &predicates);
        let expected = file.entries().iter().filter(|e| level_filter.allows(e.level())).count();
        prop_assert_eq!(view.len(), expected);
        for &index in view.rows() {
            let entry = file.entry(index).expect("row points at an entry");
            prop_assert!(level_filter.allows(entry.level()));
        }
    }
}

// ===== Property 6: reset =====

proptest! {
    #[test]
    fn reset_restores_session_shape(file in log_file(), actions in prop::collection::vec(action(), 0..20)) {
        let mut state = store();
        state.select_log_file(Some(Arc::new(file)));
        for a in &actions {
            apply(&mut state, a);
        }
        let prefs_before = state.preferences().clone();

        state.reset(false);

        prop_assert!(state.selected_log_file().is_none());
        prop_assert_eq!(state.selected_entry_index(), None);
        prop_assert!(state.level_filter().is_empty());
        prop_assert_eq!(state.search_index(), 0);
        prop_assert!(!state.show_only_search_results());
        prop_assert!(!state.is_spotlight_open());
        prop_assert!(!state.is_details_visible());
        prop_assert_eq!(*state.date_range(), DateRange::unbounded());
        prop_assert!(state.cache_keys().is_empty());
        prop_assert!(state.cache_path().is_none());
        prop_assert!(state.selected_cache_key().is_none());
        prop_assert!(!state.is_loading_cache_keys());
        prop_assert_eq!(state.preferences(), &prefs_before);
    }
}

// ===== Property 7: Search navigation =====

proptest! {
    #[test]
    fn search_cursor_lands_on_a_match(file in log_file(), steps in prop::collection::vec(prop::bool::ANY, 0..30)) {
        let mut state = store();
        state.select_log_file(Some(Arc::new(file)));
        state.set_search("message 1");

        for forward in steps {
            if forward {
                state.next_search_result();
            } else {
                state.previous_search_result();
            }
        }

        let matches = state.filtered_view().search_matches().to_vec();
        match state.current_search_row() {
            None => prop_assert!(matches.is_empty()),
            Some(row) => prop_assert!(matches.contains(&row)),
        }
    }
}
