//! Header bar: level filter buttons or the search input.

use crate::filter::{FilterController, FilterView};
use crate::model::FilterLevel;
use crate::view::styles::Palette;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Key that toggles each level in the menu.
pub fn level_key(level: FilterLevel) -> char {
    match level {
        FilterLevel::Error => 'e',
        FilterLevel::Warning => 'w',
        FilterLevel::Info => 'i',
        FilterLevel::Debug => 'd',
    }
}

/// Level toggled by a menu key.
pub fn level_for_key(c: char) -> Option<FilterLevel> {
    FilterLevel::ALL.into_iter().find(|l| level_key(*l) == c)
}

fn label(level: FilterLevel) -> &'static str {
    match level {
        FilterLevel::Error => "Filter Error",
        FilterLevel::Warning => "Filter Warning",
        FilterLevel::Info => "Filter Info",
        FilterLevel::Debug => "Filter Debug",
    }
}

/// Filter bar widget.
pub struct FilterBar<'a> {
    controller: &'a FilterController,
    match_status: Option<(usize, usize)>,
    palette: Palette,
}

impl<'a> FilterBar<'a> {
    /// Create the widget. `match_status` is `(current, total)` for the
    /// active search, shown next to the input.
    pub fn new(controller: &'a FilterController, match_status: Option<(usize, usize)>, palette: Palette) -> Self {
        Self {
            controller,
            match_status,
            palette,
        }
    }

    fn menu_line(&self) -> Line<'static> {
        let mut spans = vec![Span::styled("[/] Search", self.palette.button())];
        for level in FilterLevel::ALL {
            let style = if self.controller.levels().is_hidden(level) {
                self.palette.engaged()
            } else {
                self.palette.button()
            };
            spans.push(Span::raw("  "));
            spans.push(Span::styled(format!("[{}] {}", level_key(level), label(level)), style));
        }
        Line::from(spans)
    }

    fn search_line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled("Search: ", self.palette.muted()),
            Span::raw(self.controller.input().to_string()),
            Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
        ];
        if let Some((current, total)) = self.match_status {
            let text = if total == 0 {
                "  no matches".to_string()
            } else {
                format!("  {current}/{total}")
            };
            spans.push(Span::styled(text, self.palette.muted()));
        }
        spans.push(Span::styled("  [Esc] close", self.palette.muted()));
        Line::from(spans)
    }
}

impl Widget for FilterBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = match self.controller.view() {
            FilterView::Menu => self.menu_line(),
            FilterView::Search => self.search_line(),
        };
        Paragraph::new(line).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterConsumer;
    use crate::view::styles::ColorConfig;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    struct Sink;

    impl FilterConsumer for Sink {
        fn on_filter_toggle(&mut self, _level: &str) {}
        fn on_search_change(&mut self, _search: &str) {}
    }

    fn render(controller: &FilterController, status: Option<(usize, usize)>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 1)).expect("terminal");
        terminal
            .draw(|frame| {
                let palette = Palette::new(true, ColorConfig::new(false));
                frame.render_widget(FilterBar::new(controller, status, palette), frame.area());
            })
            .expect("draw");
        let buffer = terminal.backend().buffer();
        (0..buffer.area.width)
            .map(|x| buffer[(x, 0)].symbol().to_string())
            .collect()
    }

    #[test]
    fn level_keys_are_unique() {
        for level in FilterLevel::ALL {
            assert_eq!(level_for_key(level_key(level)), Some(level));
        }
        assert_eq!(level_for_key('x'), None);
    }

    #[test]
    fn menu_lists_every_level_button() {
        let text = render(&FilterController::default(), None);
        assert!(text.contains("[/] Search"));
        assert!(text.contains("[e] Filter Error"));
        assert!(text.contains("[d] Filter Debug"));
    }

    #[test]
    fn search_view_shows_input_and_match_count() {
        let mut controller = FilterController::default();
        controller.toggle_search(&mut Sink);
        controller.on_search_input("gpu", std::time::Instant::now());

        let text = render(&controller, Some((2, 5)));
        assert!(text.contains("Search: gpu"), "got: {text}");
        assert!(text.contains("2/5"));
    }
}
