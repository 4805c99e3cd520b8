//! OS-level light/dark signal.
//!
//! Runtimes without a preference query, or without change notifications,
//! degrade silently: initial resolution uses whatever `current` reports and
//! live updates simply never arrive.

use crate::subscription::Subscription;
use crate::theme::Theme;

/// Callback invoked with the new OS preference (`None` = no preference).
pub type OsHandler = Box<dyn Fn(Option<Theme>)>;

pub trait OsPreferenceSource {
    /// The current OS preference, if the runtime exposes one.
    fn current(&self) -> Option<Theme>;
    /// Observe preference changes. `None` when the runtime cannot notify.
    fn subscribe(&self, handler: OsHandler) -> Option<Subscription>;
}

/// A signal that never changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedOsPreference(pub Option<Theme>);

impl OsPreferenceSource for FixedOsPreference {
    fn current(&self) -> Option<Theme> {
        self.0
    }

    fn subscribe(&self, _handler: OsHandler) -> Option<Subscription> {
        None
    }
}
