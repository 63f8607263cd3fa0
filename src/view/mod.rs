//! TUI rendering and terminal management (impure shell)

mod details;
mod filter_bar;
pub mod layout;
mod sidebar;
pub mod styles;
mod table;

pub use details::{DetailsPane, format_meta};
pub use filter_bar::{FilterBar, level_for_key, level_key};
pub use layout::{AppLayout, PaneFlags, centered_rect, compute_layout};
pub use sidebar::{Sidebar, SidebarContent, Spotlight, truncate_to_width};
pub use styles::{ColorConfig, Palette};
pub use table::LogTable;

use crate::config::ResolvedConfig;
use crate::filter::{FilterController, FilterView};
use crate::model::{AppError, DateRange, LogFile, LogFileKind, SourceError};
use crate::prefs::{JsonFileBackend, PreferenceStore};
use crate::runtime::Runtime;
use crate::source::{
    CommandCacheKeyLister, DirectoryScanner, cache_dir_for, cache_keys_file, launch_editor,
    load_log_file,
};
use crate::state::{
    Callbacks, HostClass, Notification, NotificationLevel, SharedHost, SleuthState, StateOptions,
    cache_inspection_supported,
};
use crate::view_state::log_table::{LogTableState, caution_banner, project_rows};
use crate::view_state::types::ViewportDimensions;
use chrono::NaiveDateTime;
use crossterm::{
    ExecutableCommand,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};
use std::cell::{Cell, RefCell};
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Longest wait for input before the loop runs pending work anyway.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Wait for input while collaborators are running, so their results show
/// up promptly.
const BUSY_POLL: Duration = Duration::from_millis(50);

/// Rows moved by one mouse wheel notch.
const WHEEL_ROWS: isize = 3;

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Log file could not be loaded
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Application error
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    state: SleuthState,
    host: SharedHost,
    runtime: Runtime,
    filter: FilterController,
    table: LogTableState,
    colors: ColorConfig,
    /// Highlighted row of the filtered view (keyboard focus).
    cursor_row: Option<usize>,
    /// Highlighted suggestion in the sidebar.
    sidebar_cursor: Option<usize>,
    /// Filled by the store's open-file callback.
    pending_open: Rc<RefCell<Option<PathBuf>>>,
    /// Set by the store's reset-app callback.
    pending_home: Rc<Cell<bool>>,
    /// A file was named on the command line; auto-open must not replace it.
    explicit_source: bool,
    status: Option<Notification>,
    last_layout: Option<AppLayout>,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen
    pub fn new(config: &ResolvedConfig) -> Result<Self, TuiError> {
        let store = PreferenceStore::new(JsonFileBackend::open(&config.preferences_path));
        let runtime = Runtime::new(
            DirectoryScanner::new(config.scan_dirs.clone(), config.scan_extensions.clone()),
            CommandCacheKeyLister::new(config.cache_tool.clone())
                .with_support(cache_inspection_supported()),
        )?;

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(crossterm::event::EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self::with_terminal(
            terminal,
            store,
            runtime,
            StateOptions::default(),
            config,
            ColorConfig::from_env(),
        ))
    }
}

impl<B> TuiApp<B>
where
    B: Backend,
{
    fn with_terminal(
        terminal: Terminal<B>,
        store: PreferenceStore,
        runtime: Runtime,
        options: StateOptions,
        config: &ResolvedConfig,
        colors: ColorConfig,
    ) -> Self {
        let host = SharedHost::new();
        let pending_open = Rc::new(RefCell::new(None));
        let pending_home = Rc::new(Cell::new(false));

        let callbacks = {
            let pending_open = Rc::clone(&pending_open);
            let pending_home = Rc::clone(&pending_home);
            Callbacks::new(
                move |path: &std::path::Path| *pending_open.borrow_mut() = Some(path.to_path_buf()),
                move || pending_home.set(true),
            )
        };

        let state = SleuthState::new(store, Box::new(host.clone()), callbacks, options);

        Self {
            terminal,
            state,
            host,
            runtime,
            filter: FilterController::new(config.search_debounce()),
            table: LogTableState::new(config.overscan_rows),
            colors,
            cursor_row: None,
            sidebar_cursor: None,
            pending_open,
            pending_home,
            explicit_source: false,
            status: None,
            last_layout: None,
        }
    }

    /// Run the main event loop
    ///
    /// Returns when user quits (q or Ctrl+C)
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.tick(Instant::now());
        self.draw()?;

        loop {
            let idle = if self.runtime.is_busy() { BUSY_POLL } else { IDLE_POLL };
            let timeout = self
                .filter
                .deadline()
                .map(|d| d.saturating_duration_since(Instant::now()).min(idle))
                .unwrap_or(idle);

            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(width, height) => debug!(width, height, "Terminal resized"),
                    _ => {}
                }
            }

            self.tick(Instant::now());
            self.draw()?;
        }
    }

    /// Work between events: fire the debounced search, hand queued
    /// commands to the runtime, deliver finished ones, and act on callbacks
    /// the store raised.
    fn tick(&mut self, now: Instant) {
        if self.filter.tick(now, &mut self.state) {
            self.jump_to_search_result();
        }

        let delivered = self.runtime.pump(&mut self.state);
        if delivered > 0 {
            debug!(delivered, "Delivered command results");
        }
        if let Some(last) = self.state.take_notifications().pop() {
            self.status = Some(last);
        }

        let requested = self.pending_open.borrow_mut().take();
        if let Some(path) = requested {
            if self.explicit_source {
                debug!(path = %path.display(), "Ignoring auto-open; a file was named on the command line");
            } else {
                self.open_path(path);
            }
        }

        if self.pending_home.replace(false) {
            self.go_home();
        }

        let count = self.state.suggestions().len();
        self.sidebar_cursor = match (self.sidebar_cursor, count) {
            (_, 0) => None,
            (Some(i), n) => Some(i.min(n - 1)),
            (None, _) => None,
        };
    }

    /// Load a file from disk and make it the session's file. Failures are
    /// shown in the status bar.
    pub fn open_path(&mut self, path: PathBuf) {
        match load_log_file(&path) {
            Ok(file) => self.show_file(path, file),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not open log file");
                self.status = Some(Notification::warning(format!("Could not open {}: {e}", path.display())));
            }
        }
    }

    /// Open a file given on the command line.
    pub fn open_initial(&mut self, path: PathBuf) {
        self.explicit_source = true;
        self.open_path(path);
    }

    /// Start a fresh session on `file`. An inspected cache directory stays
    /// inspected; its keys are listed again.
    fn show_file(&mut self, path: PathBuf, file: LogFile) {
        info!(path = %path.display(), entries = file.len(), log_type = file.log_type().as_str(), "Opened log file");
        let file = Arc::new(file);
        let cache_path = self.state.cache_path().map(Path::to_path_buf);
        self.state.batch(|s| {
            s.reset(false);
            s.set_source(Some(path));
            s.select_log_file(Some(file));
            s.set_cache_path(cache_path);
        });
        self.filter.sync_levels(*self.state.level_filter());
        self.cursor_row = None;
        self.table.on_scroll(0, 0);
        self.status = None;
    }

    /// Inspect a cache directory, or stop inspecting with `None`.
    pub fn inspect_cache(&mut self, dir: Option<PathBuf>) {
        self.status = Some(match &dir {
            Some(dir) => Notification::info(format!("Inspecting cache in {}", dir.display())),
            None => Notification::info("Cache inspection off"),
        });
        self.state.set_cache_path(dir);
    }

    /// Show the enumerated cache keys in the table, one row per key.
    fn show_cache_keys(&mut self) {
        let Some(dir) = self.state.cache_path().map(Path::to_path_buf) else {
            self.status = Some(Notification::warning("No cache directory under inspection (c)"));
            return;
        };
        if self.state.cache_keys().is_empty() {
            self.status = Some(Notification::warning("No cache keys listed"));
            return;
        }

        let file = cache_keys_file(&dir, self.state.cache_keys());
        info!(dir = %dir.display(), keys = file.len(), "Showing cache keys");
        self.status = Some(Notification::info(format!("{} cache keys in {}", file.len(), dir.display())));
        self.state.select_log_file(Some(Arc::new(file)));
        self.cursor_row = None;
        self.table.on_scroll(0, 0);
    }

    fn highlighted_suggestion(&self) -> Option<PathBuf> {
        self.sidebar_cursor
            .and_then(|i| self.state.suggestions().get(i))
            .map(|s| s.file_path.clone())
    }

    /// Entry index under the keyboard cursor.
    fn cursor_entry(&mut self) -> Option<usize> {
        let row = self.cursor_row?;
        self.state.filtered_view().rows().get(row).copied()
    }

    fn cursor_moment(&mut self) -> Option<NaiveDateTime> {
        let index = self.cursor_entry()?;
        self.state.selected_log_file()?.entry(index)?.moment()
    }

    /// Bound the date range at the cursor entry's instant.
    fn bound_date_range(&mut self, lower: bool) {
        let Some(moment) = self.cursor_moment() else {
            self.status = Some(Notification::warning("Entry under the cursor has no timestamp"));
            return;
        };
        let mut range = *self.state.date_range();
        if lower {
            range.from = Some(moment);
        } else {
            range.to = Some(moment);
        }
        self.state.set_date_range(range);
        self.status = None;
        self.clamp_cursor();
    }

    /// Open the source file at the cursor entry's line in the editor.
    fn open_in_editor(&mut self) {
        let line = self
            .cursor_entry()
            .and_then(|index| self.state.selected_log_file()?.entry(index)?.line());
        let (Some(path), Some(line)) = (self.state.source().map(Path::to_path_buf), line) else {
            self.status = Some(Notification::warning("No source line for the entry under the cursor"));
            return;
        };

        let command = self.state.preferences().default_editor.clone();
        self.status = Some(match launch_editor(&command, &path, line) {
            Ok(()) => Notification::info(format!("Opened {}:{line} in editor", path.display())),
            Err(e) => {
                warn!(error = %e, "Could not launch editor");
                Notification::warning(format!("Could not open editor: {e}"))
            }
        });
    }

    /// Enter or click on a row: select it, and pick the key when the table
    /// shows a cache listing.
    fn activate_row(&mut self, row: usize) {
        self.state.click_row(row);
        let is_listing = self
            .state
            .selected_log_file()
            .is_some_and(|f| f.kind() == LogFileKind::Tool);
        if !is_listing {
            return;
        }
        let index = self.state.filtered_view().rows().get(row).copied();
        let key = index
            .and_then(|index| self.state.selected_log_file()?.entry(index))
            .map(|entry| entry.message().to_string());
        if key.is_some() {
            self.state.select_cache_key(key);
        }
    }

    fn go_home(&mut self) {
        info!("Back to home view");
        self.state.set_source(None);
        if !self.state.is_sidebar_open() {
            self.state.toggle_sidebar();
        }
        self.filter.sync_levels(*self.state.level_filter());
        self.cursor_row = None;
        self.table.on_scroll(0, 0);
        self.status = Some(Notification::info("Pick a log to open"));
    }

    // ===== Input =====

    /// Handle a key press. Returns true if the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        if self.state.is_spotlight_open() {
            self.handle_spotlight_key(key);
            return false;
        }

        match self.filter.view() {
            FilterView::Search => {
                self.handle_search_key(key);
                false
            }
            FilterView::Menu => self.handle_menu_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let now = Instant::now();
        match key.code {
            KeyCode::Esc => self.filter.toggle_search(&mut self.state),
            KeyCode::Enter => {
                self.filter.flush(&mut self.state);
                self.jump_to_search_result();
            }
            KeyCode::Backspace => self.filter.pop_char(now),
            KeyCode::Char(c) => self.filter.push_char(c, now),
            _ => {}
        }
    }

    fn handle_spotlight_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('p') => self.state.toggle_spotlight(),
            KeyCode::Up | KeyCode::Char('k') => self.move_sidebar_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => self.move_sidebar_cursor(1),
            KeyCode::Enter => {
                if let Some(path) = self.highlighted_suggestion() {
                    self.state.toggle_spotlight();
                    self.open_path(path);
                }
            }
            _ => {}
        }
    }

    fn move_sidebar_cursor(&mut self, delta: isize) {
        let count = self.state.suggestions().len();
        if count == 0 {
            return;
        }
        self.sidebar_cursor = Some(match self.sidebar_cursor {
            None => 0,
            Some(i) => (i as isize + delta).rem_euclid(count as isize) as usize,
        });
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> bool {
        if let Some(level) = match key.code {
            KeyCode::Char(c) => level_for_key(c),
            _ => None,
        } {
            self.filter.on_filter_toggle(level.as_str(), &mut self.state);
            self.clamp_cursor();
            return false;
        }

        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('/') => self.filter.toggle_search(&mut self.state),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-self.page_rows()),
            KeyCode::PageDown => self.move_cursor(self.page_rows()),
            KeyCode::Home => self.move_cursor(isize::MIN),
            KeyCode::End => self.move_cursor(isize::MAX),
            KeyCode::Enter => {
                if let Some(row) = self.cursor_row {
                    self.activate_row(row);
                }
            }
            KeyCode::Esc => self.state.set_details_visible(false),
            KeyCode::Char('n') => {
                self.state.next_search_result();
                self.jump_to_search_result();
            }
            KeyCode::Char('N') => {
                self.state.previous_search_result();
                self.jump_to_search_result();
            }
            KeyCode::Char('o') => {
                self.state.toggle_show_only_search_results();
                self.clamp_cursor();
            }
            KeyCode::Char('t') => {
                let sort = self.state.preferences().default_sort.flipped();
                self.state.set_default_sort(sort);
            }
            KeyCode::Char('D') => self.state.toggle_dark_mode(),
            KeyCode::Char('s') => self.state.toggle_sidebar(),
            KeyCode::Char('p') => self.state.toggle_spotlight(),
            KeyCode::Tab => self.move_sidebar_cursor(1),
            KeyCode::Char('l') => {
                if let Some(path) = self.highlighted_suggestion() {
                    self.open_path(path);
                }
            }
            KeyCode::Char('c') => {
                if self.state.cache_path().is_some() {
                    self.inspect_cache(None);
                } else if let Some(dir) = self.highlighted_suggestion().as_deref().and_then(cache_dir_for) {
                    self.inspect_cache(Some(dir));
                } else {
                    self.status = Some(Notification::warning("Highlight a log first (Tab)"));
                }
            }
            KeyCode::Char('K') => self.show_cache_keys(),
            KeyCode::Char('f') => self.bound_date_range(true),
            KeyCode::Char('u') => self.bound_date_range(false),
            KeyCode::Char('F') => {
                self.state.set_date_range(DateRange::unbounded());
                self.clamp_cursor();
            }
            KeyCode::Char('E') => self.open_in_editor(),
            KeyCode::Char('r') => self.state.get_suggestions(),
            KeyCode::Char('x') => self.state.reset(true),
            _ => {}
        }
        false
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let total = self.state.filtered_view().len();
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(layout) = self.last_layout else {
                    return;
                };
                let Some(row) = layout.table_row_at(mouse.column, mouse.row, self.table.scroll_top()) else {
                    return;
                };
                if row < total {
                    self.cursor_row = Some(row);
                    self.activate_row(row);
                }
            }
            MouseEventKind::ScrollDown => self.table.scroll_by(WHEEL_ROWS, total),
            MouseEventKind::ScrollUp => self.table.scroll_by(-WHEEL_ROWS, total),
            _ => {}
        }
    }

    fn page_rows(&self) -> isize {
        (self.table.viewport().height.max(1)) as isize
    }

    fn move_cursor(&mut self, delta: isize) {
        let total = self.state.filtered_view().len();
        if total == 0 {
            self.cursor_row = None;
            return;
        }
        let current = self.cursor_row.unwrap_or(self.table.scroll_top());
        let row = current.saturating_add_signed(delta).min(total - 1);
        self.cursor_row = Some(row);
        self.table.ensure_visible(row, total);
    }

    fn clamp_cursor(&mut self) {
        let total = self.state.filtered_view().len();
        self.cursor_row = self.cursor_row.filter(|_| total > 0).map(|r| r.min(total - 1));
        self.table.on_scroll(self.table.scroll_top(), total);
    }

    fn jump_to_search_result(&mut self) {
        let total = self.state.filtered_view().len();
        if let Some(row) = self.state.current_search_row() {
            self.cursor_row = Some(row);
            self.table.ensure_visible(row, total);
        } else {
            self.clamp_cursor();
        }
    }

    // ===== Rendering =====

    fn draw(&mut self) -> Result<(), TuiError> {
        let size = self.terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);

        let file = self.state.selected_log_file().cloned();
        let banner = file.as_deref().and_then(caution_banner);
        let flags = PaneFlags {
            sidebar: self.state.is_sidebar_open(),
            details: self.state.is_details_visible(),
            banner: banner.is_some(),
        };
        let layout = compute_layout(area, flags);
        self.last_layout = Some(layout);

        let format = self.state.preferences().date_time_format.clone();
        let selected = self.state.selected_entry_index();
        let search_active = !self.state.search().is_empty();
        let search_index = self.state.search_index();

        let view = self.state.filtered_view();
        let total = view.len();
        let match_count = view.search_matches().len();
        self.table.on_resize(
            ViewportDimensions::new(layout.table.width, layout.table_body_height()),
            total,
        );
        let range = self.table.window(total);
        let rows = match &file {
            Some(file) => project_rows(file, view, &range, &format, selected),
            None => Vec::new(),
        };

        let match_status = search_active.then(|| {
            let current = if match_count == 0 {
                0
            } else {
                search_index.min(match_count - 1) + 1
            };
            (current, match_count)
        });

        let palette = Palette::new(self.host.has_class(HostClass::Dark), self.colors);
        let status_line = self.status_line(total, palette);
        let state = &self.state;
        let filter = &self.filter;
        let cursor = self.cursor_row;
        let sidebar_cursor = self.sidebar_cursor;

        self.terminal.draw(|frame| {
            frame.render_widget(FilterBar::new(filter, match_status, palette), layout.header);

            if let (Some(area), Some(text)) = (layout.banner, banner) {
                frame.render_widget(Paragraph::new(Line::styled(text, palette.banner())), area);
            }

            if let Some(area) = layout.sidebar {
                let content = SidebarContent {
                    suggestions: state.suggestions(),
                    cursor: sidebar_cursor,
                    cache_keys: state.cache_keys(),
                    selected_cache_key: state.selected_cache_key(),
                    loading_cache_keys: state.is_loading_cache_keys(),
                };
                frame.render_widget(Sidebar::new(content, palette), area);
            }

            frame.render_widget(LogTable::new(&rows, range.first_visible, cursor, palette), layout.table);

            if let Some(area) = layout.details {
                frame.render_widget(DetailsPane::new(state.selected_entry(), palette), area);
            }

            frame.render_widget(Paragraph::new(status_line), layout.status);

            if state.is_spotlight_open() {
                let height = state.suggestions().len().clamp(1, 12) as u16 + 2;
                let popup = centered_rect(area, 60, height);
                frame.render_widget(Spotlight::new(state.suggestions(), sidebar_cursor, palette), popup);
            }
        })?;
        Ok(())
    }

    fn status_line(&self, total: usize, palette: Palette) -> Line<'static> {
        if let Some(note) = &self.status {
            let style = match note.level {
                NotificationLevel::Warning => palette.warning(),
                NotificationLevel::Info => palette.muted(),
            };
            return Line::styled(note.text.clone(), style);
        }

        let source = self
            .state
            .source()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "No file open".to_string());
        let mut spans = vec![
            Span::raw(source),
            Span::styled(format!("  {total} rows"), palette.muted()),
        ];
        if let Some(range) = describe_range(self.state.date_range()) {
            spans.push(Span::styled(format!("  {range}"), palette.engaged()));
        }
        spans.push(Span::styled("  [q] quit  [/] search  [p] open  [x] home", palette.muted()));
        Line::from(spans)
    }
}

/// Short text for a bounded date range, `None` when unbounded.
fn describe_range(range: &DateRange) -> Option<String> {
    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    match (range.from, range.to) {
        (None, None) => None,
        (Some(from), None) => Some(format!("from {}", from.format(FORMAT))),
        (None, Some(to)) => Some(format!("until {}", to.format(FORMAT))),
        (Some(from), Some(to)) => Some(format!("{} to {}", from.format(FORMAT), to.format(FORMAT))),
    }
}

/// Initialize and run the TUI application
///
/// This is the main entry point for the TUI. It handles terminal
/// setup, runs the event loop, and ensures cleanup on exit.
///
/// Note: Logging must be initialized by caller before calling this function.
pub fn run(config: &ResolvedConfig, file: Option<PathBuf>) -> Result<(), TuiError> {
    let mut app = TuiApp::new(config)?;
    if let Some(path) = file {
        app.open_initial(path);
    }
    if let Some(dir) = &config.cache_path {
        app.inspect_cache(Some(dir.clone()));
    }

    // Run the app and ensure cleanup happens even on error
    let result = app.run();

    // Always restore terminal state
    restore_terminal()?;

    result
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(crossterm::event::DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
