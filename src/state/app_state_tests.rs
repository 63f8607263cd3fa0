//! Tests for SleuthState.

use super::*;
use crate::model::{LogEntry, LogLevel, LogType};
use crate::prefs::MemoryBackend;
use crate::state::host::SharedHost;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// ===== Test Helpers =====

struct Harness {
    state: SleuthState,
    host: SharedHost,
    opened: Rc<RefCell<Vec<PathBuf>>>,
    resets: Rc<Cell<usize>>,
}

fn harness_with(backend: MemoryBackend, options: StateOptions) -> Harness {
    let host = SharedHost::new();
    let opened = Rc::new(RefCell::new(Vec::new()));
    let resets = Rc::new(Cell::new(0));

    let callbacks = {
        let opened = Rc::clone(&opened);
        let resets = Rc::clone(&resets);
        Callbacks::new(
            move |path: &Path| opened.borrow_mut().push(path.to_path_buf()),
            move || resets.set(resets.get() + 1),
        )
    };

    let state = SleuthState::new(
        PreferenceStore::new(backend),
        Box::new(host.clone()),
        callbacks,
        options,
    );

    Harness {
        state,
        host,
        opened,
        resets,
    }
}

fn harness() -> Harness {
    harness_with(MemoryBackend::new(), StateOptions { cache_inspection: true })
}

fn auto_open_harness() -> Harness {
    harness_with(
        MemoryBackend::with_values([("isOpenMostRecent", "true")]),
        StateOptions { cache_inspection: true },
    )
}

fn ten_entries_three_errors() -> Arc<LogFile> {
    let entries = (0..10)
        .map(|i| {
            let level = if i % 3 == 0 && i > 0 {
                LogLevel::Error
            } else {
                LogLevel::Info
            };
            let entry = LogEntry::new(format!("t{i}"), level, format!("line {i}"), LogType::Browser);
            if i == 4 {
                entry.with_meta(serde_json::json!({"url": "https://example.org"}))
            } else {
                entry
            }
        })
        .collect();
    Arc::new(LogFile::processed("browser.log", LogType::Browser, entries))
}

fn dirty_session(state: &mut SleuthState) {
    state.select_log_file(Some(ten_entries_three_errors()));
    state.select_entry(Some(4));
    for level in FilterLevel::ALL {
        state.toggle_level_filter(level);
    }
    state.set_search("line");
    state.next_search_result();
    state.set_show_only_search_results(true);
    state.toggle_spotlight();
    state.set_details_visible(true);
    state.set_date_range(DateRange {
        from: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
        to: None,
    });
    state.set_cache_path(Some(PathBuf::from("/tmp/cache")));
    let generation = match state.take_commands().pop() {
        Some(Command::ListCacheKeys { generation, .. }) => generation,
        other => panic!("expected cache command, got {other:?}"),
    };
    state.receive_cache_keys(generation, Ok(vec!["a".into(), "b".into()]));
    state.select_cache_key(Some("a".into()));
}

// ===== Construction =====

#[test]
fn construction_queues_exactly_one_scan() {
    let mut h = harness();
    assert_eq!(h.state.take_commands(), vec![Command::ScanSuggestions]);
    assert!(h.state.take_commands().is_empty());
}

#[test]
fn construction_applies_host_presentation() {
    let h = harness();
    assert!(h.host.has_class(HostClass::Dark));
    assert!(h.host.has_class(HostClass::SidebarOpen));
    assert_eq!(h.host.snapshot().icon, Some(IconName::Mark));
}

#[test]
fn construction_hydrates_stored_preferences() {
    let backend = MemoryBackend::with_values([
        ("isDarkMode", "false"),
        ("defaultSort", "asc"),
        ("font", "Menlo"),
    ]);
    let h = harness_with(backend, StateOptions::default());

    let prefs = h.state.preferences();
    assert!(!prefs.is_dark_mode);
    assert_eq!(prefs.default_sort, SortDirection::Ascending);
    assert_eq!(prefs.font, "Menlo");
    assert!(!h.host.has_class(HostClass::Dark));
}

#[test]
fn corrupt_structured_preference_falls_back_to_default() {
    let backend = MemoryBackend::with_values([("isMarkIcon", "{not json")]);
    let h = harness_with(backend, StateOptions::default());
    assert!(h.state.preferences().is_mark_icon);
}

// ===== Reset =====

#[test]
fn reset_clears_session_state() {
    let mut h = harness();
    dirty_session(&mut h.state);

    h.state.reset(false);

    let s = &h.state;
    assert!(s.selected_entry_index().is_none());
    assert!(s.selected_log_file().is_none());
    for level in FilterLevel::ALL {
        assert!(!s.level_filter().is_hidden(level));
    }
    assert_eq!(s.search_index(), 0);
    assert!(!s.show_only_search_results());
    assert!(!s.is_spotlight_open());
    assert!(!s.is_details_visible());
    assert!(s.date_range().is_unbounded());
    assert!(s.cache_keys().is_empty());
    assert!(s.cache_path().is_none());
    assert!(s.selected_cache_key().is_none());
    assert!(!s.is_loading_cache_keys());
}

#[test]
fn reset_keeps_preferences() {
    let mut h = harness();
    h.state.toggle_dark_mode();
    h.state.set_font("Fira Code");
    h.state.set_default_sort(SortDirection::Ascending);
    dirty_session(&mut h.state);
    let before = h.state.preferences().clone();

    h.state.reset(true);

    assert_eq!(h.state.preferences(), &before);
}

#[test]
fn reset_home_callback_fires_only_when_requested() {
    let mut h = harness();
    h.state.reset(false);
    assert_eq!(h.resets.get(), 0);

    h.state.reset(true);
    assert_eq!(h.resets.get(), 1);
}

#[test]
fn reset_while_enumerating_clears_loading_flag() {
    let mut h = harness();
    h.state.set_cache_path(Some(PathBuf::from("/cache")));
    assert!(h.state.is_loading_cache_keys());

    h.state.reset(false);
    assert!(!h.state.is_loading_cache_keys());
}

// ===== Suggestions & auto-open =====

#[test]
fn auto_open_picks_strict_maximum() {
    let mut h = auto_open_harness();
    h.state.receive_suggestions(Ok(vec![
        Suggestion::new("/logs/a.zip", 10),
        Suggestion::new("/logs/b.zip", 30),
        Suggestion::new("/logs/c.zip", 20),
    ]));
    assert_eq!(*h.opened.borrow(), vec![PathBuf::from("/logs/b.zip")]);
}

#[test]
fn auto_open_tie_keeps_first_seen() {
    let mut h = auto_open_harness();
    h.state.receive_suggestions(Ok(vec![
        Suggestion::new("/logs/first.zip", 30),
        Suggestion::new("/logs/second.zip", 30),
    ]));
    assert_eq!(*h.opened.borrow(), vec![PathBuf::from("/logs/first.zip")]);
}

#[test]
fn auto_open_fires_once_per_process() {
    let mut h = auto_open_harness();
    let list = vec![Suggestion::new("/logs/a.zip", 1)];
    h.state.receive_suggestions(Ok(list.clone()));
    h.state.receive_suggestions(Ok(list));
    h.state.open_most_recent_suggestion_maybe();
    assert_eq!(h.opened.borrow().len(), 1);
}

#[test]
fn auto_open_requires_preference() {
    let mut h = harness();
    h.state.receive_suggestions(Ok(vec![Suggestion::new("/logs/a.zip", 1)]));
    assert!(h.opened.borrow().is_empty());
}

#[test]
fn auto_open_waits_for_non_empty_list() {
    let mut h = auto_open_harness();
    h.state.receive_suggestions(Ok(Vec::new()));
    assert!(h.opened.borrow().is_empty());

    h.state.receive_suggestions(Ok(vec![Suggestion::new("/logs/late.zip", 5)]));
    assert_eq!(h.opened.borrow().len(), 1);
}

#[test]
fn suggestions_are_fully_replaced() {
    let mut h = harness();
    h.state.receive_suggestions(Ok(vec![Suggestion::new("/a", 1), Suggestion::new("/b", 2)]));
    h.state.receive_suggestions(Ok(vec![Suggestion::new("/c", 3)]));
    assert_eq!(h.state.suggestions(), &[Suggestion::new("/c", 3)]);
}

#[test]
fn failed_scan_keeps_previous_list_and_notifies() {
    let mut h = harness();
    h.state.receive_suggestions(Ok(vec![Suggestion::new("/a", 1)]));
    h.state.receive_suggestions(Err(ScanError::ReadDir {
        path: PathBuf::from("/downloads"),
        source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
    }));

    assert_eq!(h.state.suggestions().len(), 1);
    let notes = h.state.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, crate::state::command::NotificationLevel::Warning);
}

// ===== Effects =====

#[test]
fn toggles_drive_host_classes() {
    let mut h = harness();
    h.state.toggle_dark_mode();
    h.state.toggle_sidebar();
    assert!(!h.host.has_class(HostClass::Dark));
    assert!(!h.host.has_class(HostClass::SidebarOpen));

    h.state.toggle_dark_mode();
    assert!(h.host.has_class(HostClass::Dark));
}

#[test]
fn dark_mode_is_persisted() {
    let mut h = harness();
    h.state.toggle_dark_mode();
    let stored: Option<bool> = h
        .state
        .preference_store()
        .retrieve_parsed(PreferenceKey::IsDarkMode);
    assert_eq!(stored, Some(false));
}

#[test]
fn icon_effect_persists_and_notifies() {
    let mut h = harness();
    let before = h.host.snapshot().icon_changes;

    h.state.set_mark_icon(false);

    assert_eq!(h.state.get_icon_path(), IconName::Classic);
    assert_eq!(h.host.snapshot().icon, Some(IconName::Classic));
    assert_eq!(h.host.snapshot().icon_changes, before + 1);
    let stored: Option<bool> = h
        .state
        .preference_store()
        .retrieve_parsed(PreferenceKey::IsMarkIcon);
    assert_eq!(stored, Some(false));
}

#[test]
fn text_preferences_are_persisted() {
    let mut h = harness();
    h.state.set_date_time_format(DateTimeFormat::new("yyyy-MM-dd HH:mm"));
    h.state.set_default_editor(EditorCommand::new("vim +{line} {filepath}"));
    h.state.set_default_sort(SortDirection::Ascending);

    let store = h.state.preference_store();
    assert_eq!(
        store.retrieve_text(PreferenceKey::DateTimeFormat).as_deref(),
        Some("yyyy-MM-dd HH:mm")
    );
    assert_eq!(
        store.retrieve_text(PreferenceKey::DefaultEditor).as_deref(),
        Some("vim +{line} {filepath}")
    );
    assert_eq!(store.retrieve_text(PreferenceKey::DefaultSort).as_deref(), Some("asc"));
}

#[test]
fn batch_coalesces_to_final_value() {
    let mut h = harness();
    let before = h.host.snapshot().icon_changes;

    h.state.batch(|s| {
        s.set_mark_icon(false);
        s.set_mark_icon(true);
        s.set_mark_icon(false);
    });

    assert_eq!(h.host.snapshot().icon_changes, before + 1);
    assert_eq!(h.host.snapshot().icon, Some(IconName::Classic));
}

#[test]
fn batch_that_restores_value_runs_effect_once_with_final_value() {
    let mut h = harness();
    h.state.batch(|s| {
        s.toggle_dark_mode();
        s.toggle_dark_mode();
    });
    assert!(h.host.has_class(HostClass::Dark));
}

// ===== Cache keys =====

#[test]
fn cache_path_change_starts_enumeration() {
    let mut h = harness();
    h.state.take_commands();

    h.state.set_cache_path(Some(PathBuf::from("/cache")));

    assert!(h.state.is_loading_cache_keys());
    assert!(matches!(
        h.state.take_commands().as_slice(),
        [Command::ListCacheKeys { cache_path, .. }] if cache_path == Path::new("/cache")
    ));
}

#[test]
fn cache_keys_strip_trailing_empty() {
    let mut h = harness();
    h.state.take_commands();
    h.state.set_cache_path(Some(PathBuf::from("/cache")));
    let Some(Command::ListCacheKeys { generation, .. }) = h.state.take_commands().pop() else {
        panic!("expected cache command");
    };

    h.state
        .receive_cache_keys(generation, Ok(vec!["k1".into(), "k2".into(), String::new()]));

    assert_eq!(h.state.cache_keys(), &["k1".to_string(), "k2".to_string()]);
    assert!(!h.state.is_loading_cache_keys());
}

#[test]
fn stale_cache_result_is_discarded() {
    let mut h = harness();
    h.state.take_commands();

    h.state.set_cache_path(Some(PathBuf::from("/old")));
    h.state.set_cache_path(Some(PathBuf::from("/new")));
    let commands = h.state.take_commands();
    let generations: Vec<u64> = commands
        .iter()
        .filter_map(|c| match c {
            Command::ListCacheKeys { generation, .. } => Some(*generation),
            Command::ScanSuggestions => None,
        })
        .collect();
    assert_eq!(generations.len(), 2);

    h.state.receive_cache_keys(generations[1], Ok(vec!["new".into()]));
    h.state.receive_cache_keys(generations[0], Ok(vec!["old".into()]));

    assert_eq!(h.state.cache_keys(), &["new".to_string()]);
}

#[test]
fn cache_failure_clears_loading_and_keeps_keys() {
    let mut h = harness();
    h.state.take_commands();
    h.state.set_cache_path(Some(PathBuf::from("/cache")));
    let Some(Command::ListCacheKeys { generation, .. }) = h.state.take_commands().pop() else {
        panic!("expected cache command");
    };
    h.state.receive_cache_keys(generation, Ok(vec!["kept".into()]));

    h.state.set_cache_path(Some(PathBuf::from("/other")));
    let Some(Command::ListCacheKeys { generation, .. }) = h.state.take_commands().pop() else {
        panic!("expected cache command");
    };
    h.state.receive_cache_keys(generation, Err(CacheKeyError::InvalidOutput));

    assert!(!h.state.is_loading_cache_keys());
    assert_eq!(h.state.cache_keys(), &["kept".to_string()]);
    assert_eq!(h.state.take_notifications().len(), 1);
}

#[test]
fn clearing_cache_path_leaves_keys_untouched() {
    let mut h = harness();
    h.state.take_commands();
    h.state.set_cache_path(Some(PathBuf::from("/cache")));
    let Some(Command::ListCacheKeys { generation, .. }) = h.state.take_commands().pop() else {
        panic!("expected cache command");
    };
    h.state.receive_cache_keys(generation, Ok(vec!["k".into()]));

    h.state.set_cache_path(None);

    assert_eq!(h.state.cache_keys(), &["k".to_string()]);
    assert!(!h.state.is_loading_cache_keys());
    assert!(h.state.take_commands().is_empty());
}

#[test]
fn unsupported_platform_never_enumerates() {
    let mut h = harness_with(MemoryBackend::new(), StateOptions { cache_inspection: false });
    h.state.take_commands();

    h.state.set_cache_path(Some(PathBuf::from("/cache")));

    assert!(!h.state.is_loading_cache_keys());
    assert!(h.state.take_commands().is_empty());
}

// ===== Filters, search & selection =====

#[test]
fn error_filter_hides_three_of_ten() {
    let mut h = harness();
    h.state.select_log_file(Some(ten_entries_three_errors()));
    h.state.toggle_level_filter(FilterLevel::Error);
    assert_eq!(h.state.filtered_view().len(), 7);
}

#[test]
fn level_toggle_pair_is_identity() {
    let mut h = harness();
    h.state.toggle_level_filter(FilterLevel::Warning);
    let once = *h.state.level_filter();
    h.state.toggle_level_filter(FilterLevel::Debug);
    h.state.toggle_level_filter(FilterLevel::Debug);
    assert_eq!(*h.state.level_filter(), once);
}

#[test]
fn filtered_view_tracks_predicate_changes() {
    let mut h = harness();
    h.state.select_log_file(Some(ten_entries_three_errors()));
    assert_eq!(h.state.filtered_view().len(), 10);

    h.state.set_search("line 7");
    h.state.set_show_only_search_results(true);
    assert_eq!(h.state.filtered_view().rows(), &[7]);

    h.state.toggle_show_only_search_results();
    assert_eq!(h.state.filtered_view().len(), 10);
}

#[test]
fn search_navigation_wraps() {
    let mut h = harness();
    h.state.select_log_file(Some(ten_entries_three_errors()));
    h.state.set_default_sort(SortDirection::Ascending);
    h.state.set_search("line 1");

    // "line 1" only; ten entries means indices 0..=9.
    assert_eq!(h.state.filtered_view().search_matches(), &[1]);
    h.state.set_search("line");
    assert_eq!(h.state.filtered_view().search_matches().len(), 10);

    h.state.previous_search_result();
    assert_eq!(h.state.search_index(), 9);
    h.state.next_search_result();
    assert_eq!(h.state.search_index(), 0);
    h.state.next_search_result();
    assert_eq!(h.state.current_search_row(), Some(1));
}

#[test]
fn new_search_resets_cursor() {
    let mut h = harness();
    h.state.select_log_file(Some(ten_entries_three_errors()));
    h.state.set_search("line");
    h.state.next_search_result();
    assert_eq!(h.state.search_index(), 1);

    h.state.set_search("line 2");
    assert_eq!(h.state.search_index(), 0);
}

#[test]
fn row_click_reveals_details_only_with_meta() {
    let mut h = harness();
    h.state.select_log_file(Some(ten_entries_three_errors()));
    h.state.set_default_sort(SortDirection::Ascending);

    h.state.click_row(4);
    assert_eq!(h.state.selected_entry_index(), Some(4));
    assert!(h.state.is_details_visible());

    h.state.click_row(5);
    assert_eq!(h.state.selected_entry_index(), Some(5));
    assert!(!h.state.is_details_visible());
}

#[test]
fn row_click_without_entry_is_ignored() {
    let mut h = harness();
    h.state.click_row(0);
    assert!(h.state.selected_entry_index().is_none());

    h.state.select_log_file(Some(ten_entries_three_errors()));
    h.state.click_row(99);
    assert!(h.state.selected_entry_index().is_none());
    assert!(!h.state.is_details_visible());
}

#[test]
fn selecting_another_file_clears_entry() {
    let mut h = harness();
    h.state.select_log_file(Some(ten_entries_three_errors()));
    h.state.select_entry(Some(3));

    h.state.select_log_file(Some(ten_entries_three_errors()));
    assert!(h.state.selected_entry_index().is_none());
}

#[test]
fn selection_out_of_range_is_ignored() {
    let mut h = harness();
    h.state.select_log_file(Some(ten_entries_three_errors()));
    h.state.select_entry(Some(42));
    assert!(h.state.selected_entry_index().is_none());
}

#[test]
fn set_source_only_stores_path() {
    let mut h = harness();
    h.state.take_commands();
    h.state.set_source(Some(PathBuf::from("/logs/run.zip")));
    assert_eq!(h.state.source(), Some(Path::new("/logs/run.zip")));
    assert!(h.state.take_commands().is_empty());
    assert!(h.opened.borrow().is_empty());
}
