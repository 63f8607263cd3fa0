//! Level toggles and debounced search input.
//!
//! The controller keeps a local mirror of the level filter so toggles
//! render immediately, while the consumer (normally the store) receives
//! every toggle by name and the search text once typing goes quiet.

use super::debounce::Debouncer;
use crate::model::{FilterLevel, LevelFilter};
use std::time::{Duration, Instant};
use tracing::debug;

/// Receives filter changes.
pub trait FilterConsumer {
    /// A level toggle, by name. Names that are not levels are forwarded too.
    fn on_filter_toggle(&mut self, level: &str);

    /// Search text after debouncing. Empty means no search.
    fn on_search_change(&mut self, search: &str);

    /// Search box shown or hidden.
    fn on_search_visibility(&mut self, _visible: bool) {}
}

/// Which of the two mutually exclusive views is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterView {
    /// Level toggle buttons.
    #[default]
    Menu,
    /// Search input.
    Search,
}

/// Stateful filter bar controller.
#[derive(Debug, Clone)]
pub struct FilterController {
    view: FilterView,
    levels: LevelFilter,
    input: String,
    debouncer: Debouncer<String>,
}

impl Default for FilterController {
    fn default() -> Self {
        Self::new(super::debounce::MIN_DEBOUNCE)
    }
}

impl FilterController {
    /// Create a controller with the given search debounce delay.
    pub fn new(debounce: Duration) -> Self {
        Self {
            view: FilterView::Menu,
            levels: LevelFilter::default(),
            input: String::new(),
            debouncer: Debouncer::new(debounce),
        }
    }

    /// Current view.
    pub fn view(&self) -> FilterView {
        self.view
    }

    /// Local level mirror.
    pub fn levels(&self) -> &LevelFilter {
        &self.levels
    }

    /// Text in the search box, including not yet propagated input.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Deadline of the pending search change, for the event loop's timeout.
    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Re-sync the local mirror, e.g. after the store was reset.
    pub fn sync_levels(&mut self, levels: LevelFilter) {
        self.levels = levels;
    }

    /// Toggle a level by name. Known names flip the local mirror; every
    /// name is forwarded.
    pub fn on_filter_toggle(&mut self, level: &str, consumer: &mut impl FilterConsumer) {
        match level_key(level) {
            Some(level) => self.levels.toggle(level),
            None => debug!(level, "Forwarding unrecognized filter toggle"),
        }
        consumer.on_filter_toggle(level);
    }

    /// Record search input. Propagation waits for the debounce delay.
    pub fn on_search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.input = text.into();
        self.debouncer.push(self.input.clone(), now);
    }

    /// Append a character to the search box.
    pub fn push_char(&mut self, c: char, now: Instant) {
        let mut text = std::mem::take(&mut self.input);
        text.push(c);
        self.on_search_input(text, now);
    }

    /// Remove the last character from the search box.
    pub fn pop_char(&mut self, now: Instant) {
        let mut text = std::mem::take(&mut self.input);
        text.pop();
        self.on_search_input(text, now);
    }

    /// Propagate pending search text if it is due. Returns whether the
    /// consumer was called.
    pub fn tick(&mut self, now: Instant, consumer: &mut impl FilterConsumer) -> bool {
        match self.debouncer.poll(now) {
            Some(text) => {
                consumer.on_search_change(&text);
                true
            }
            None => false,
        }
    }

    /// Propagate pending search text immediately.
    pub fn flush(&mut self, consumer: &mut impl FilterConsumer) -> bool {
        match self.debouncer.flush() {
            Some(text) => {
                consumer.on_search_change(&text);
                true
            }
            None => false,
        }
    }

    /// Switch between menu and search. Either way the search is cleared and
    /// pending input is dropped.
    pub fn toggle_search(&mut self, consumer: &mut impl FilterConsumer) {
        self.debouncer.cancel();
        self.input.clear();
        consumer.on_search_change("");

        self.view = match self.view {
            FilterView::Menu => FilterView::Search,
            FilterView::Search => FilterView::Menu,
        };
        consumer.on_search_visibility(self.view == FilterView::Search);
    }
}

/// Keys of the local mirror. Same names the store accepts, aliases included.
fn level_key(name: &str) -> Option<FilterLevel> {
    name.parse().ok()
}

// ===== Store wiring =====

impl FilterConsumer for crate::state::SleuthState {
    fn on_filter_toggle(&mut self, level: &str) {
        match level.parse::<FilterLevel>() {
            Ok(level) => self.toggle_level_filter(level),
            Err(e) => debug!(error = %e, "Ignoring toggle for unknown filter"),
        }
    }

    fn on_search_change(&mut self, search: &str) {
        self.set_search(search);
    }

    fn on_search_visibility(&mut self, visible: bool) {
        self.set_search_visible(visible);
    }
}
