//! Painting the effective theme.
//!
//! SYSTEM CONTEXT
//! ==============
//! The root element attribute is the single source of truth for styling.
//! Each apply writes it, runs the page's registered callback (if any), then
//! fires exactly one document-level notification. Repeat applies of the same
//! theme still notify so icons and other derived UI can refresh.

use std::cell::RefCell;
use std::rc::Rc;

use crate::theme::Theme;

#[cfg(test)]
#[path = "apply_test.rs"]
mod apply_test;

/// The document a theme is painted on.
pub trait ThemeSurface {
    /// Set `attribute` on the root element to the theme literal.
    fn set_theme_attribute(&self, attribute: &str, theme: Theme);
    /// Fire `event_name` carrying `{ theme }` for listeners outside the controller.
    fn dispatch_theme_change(&self, event_name: &str, theme: Theme);
}

/// Page callback invoked on every apply.
pub type ThemeCallback = Rc<dyn Fn(Theme)>;

pub struct ThemeApplier {
    surface: Rc<dyn ThemeSurface>,
    attribute: String,
    event_name: String,
    callback: RefCell<Option<ThemeCallback>>,
}

impl ThemeApplier {
    pub fn new(surface: Rc<dyn ThemeSurface>, attribute: impl Into<String>, event_name: impl Into<String>) -> Self {
        Self { surface, attribute: attribute.into(), event_name: event_name.into(), callback: RefCell::new(None) }
    }

    /// Replace the registered callback. At most one is held.
    pub fn set_callback(&self, callback: Option<ThemeCallback>) {
        *self.callback.borrow_mut() = callback;
    }

    pub fn apply(&self, theme: Theme) {
        self.surface.set_theme_attribute(&self.attribute, theme);

        // Clone out so the callback may re-enter the controller.
        let callback = self.callback.borrow().clone();
        if let Some(callback) = callback {
            callback(theme);
        }

        self.surface.dispatch_theme_change(&self.event_name, theme);
    }
}

impl std::fmt::Debug for ThemeApplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeApplier")
            .field("attribute", &self.attribute)
            .field("event_name", &self.event_name)
            .field("has_callback", &self.callback.borrow().is_some())
            .finish_non_exhaustive()
    }
}
