//! Palettes for the dark and light presentations.

use crate::model::LogLevel;
use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Colors are disabled by the `NO_COLOR` environment variable, whatever its
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Read `NO_COLOR`.
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    /// Explicit setting.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== Palette =====

/// Styles for every part of the screen in one presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    dark: bool,
    colors: ColorConfig,
}

impl Palette {
    /// Palette for the dark or light presentation.
    pub fn new(dark: bool, colors: ColorConfig) -> Self {
        Self { dark, colors }
    }

    /// Whether this is the dark presentation.
    pub fn is_dark(&self) -> bool {
        self.dark
    }

    fn paint(&self, fg: Color, bg: Option<Color>) -> Style {
        if !self.colors.colors_enabled() {
            return Style::default();
        }
        let style = Style::default().fg(fg);
        match bg {
            Some(bg) => style.bg(bg),
            None => style,
        }
    }

    /// Screen background and default text.
    pub fn base(&self) -> Style {
        if self.dark {
            self.paint(Color::Gray, Some(Color::Black))
        } else {
            self.paint(Color::Black, Some(Color::White))
        }
    }

    /// Secondary text such as hints and borders.
    pub fn muted(&self) -> Style {
        self.paint(Color::DarkGray, None)
    }

    /// A filter button that is off.
    pub fn button(&self) -> Style {
        self.muted()
    }

    /// A filter button that is engaged.
    pub fn engaged(&self) -> Style {
        let fg = if self.dark { Color::LightMagenta } else { Color::Magenta };
        self.paint(fg, None).add_modifier(Modifier::BOLD)
    }

    /// Level column for a level.
    pub fn level(&self, level: LogLevel) -> Style {
        match level {
            LogLevel::Error => self.paint(Color::Red, None).add_modifier(Modifier::BOLD),
            LogLevel::Warning => self.paint(Color::Yellow, None),
            LogLevel::Info => self.paint(if self.dark { Color::Cyan } else { Color::Blue }, None),
            LogLevel::Debug => self.muted(),
            LogLevel::Other => Style::default(),
        }
    }

    /// The selected row.
    pub fn selected(&self) -> Style {
        let bg = if self.dark { Color::DarkGray } else { Color::Gray };
        self.paint(if self.dark { Color::White } else { Color::Black }, Some(bg))
            .add_modifier(Modifier::BOLD)
    }

    /// The row under the keyboard cursor.
    pub fn cursor(&self) -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }

    /// A row matching the active search.
    pub fn search_match(&self) -> Style {
        self.paint(Color::Black, Some(Color::Yellow))
    }

    /// Caution banner.
    pub fn banner(&self) -> Style {
        self.paint(Color::Black, Some(Color::LightYellow))
            .add_modifier(Modifier::BOLD)
    }

    /// Warning notification in the status bar.
    pub fn warning(&self) -> Style {
        self.paint(Color::LightRed, None)
    }
}

// ===== Tests =====
