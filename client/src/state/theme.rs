//! Reactive mirror of the effective theme.
//!
//! DESIGN
//! ======
//! The document attribute stays the source of truth for styling. This state
//! only exists so Leptos views (the toggle icon, its label) re-render when
//! the controller applies a theme, whether the change was local or came
//! from another tab.

use switchboard::Theme;

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ThemeState {
    pub theme: Theme,
    /// Number of applies observed, including repeats of the same theme.
    pub applied: u64,
}

impl ThemeState {
    /// Record an apply reported by the controller.
    pub fn record(&mut self, theme: Theme) {
        self.theme = theme;
        self.applied += 1;
    }

    /// Glyph for the toggle: the theme a click switches to.
    pub fn toggle_icon(&self) -> &'static str {
        if self.theme.is_dark() { "☀" } else { "☾" }
    }

    pub fn toggle_title(&self) -> String {
        format!("Switch to {} theme", self.theme.toggled())
    }
}
