//! Listener handles.
//!
//! DESIGN
//! ======
//! Every event source (storage notifications, the broadcast channel, the OS
//! preference query) hands back a [`Subscription`]. The controller keeps them
//! for the lifetime of the context. Dropping a handle does not unregister
//! the listener; only [`Subscription::unsubscribe`] does. Browser handles own
//! their JS closures through the teardown, so dropping one early leaves a
//! listener pointing at a freed closure.

use std::fmt;

/// A registered listener.
pub struct Subscription {
    label: &'static str,
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Subscription whose teardown runs `teardown`.
    pub fn new(label: &'static str, teardown: impl FnOnce() + 'static) -> Self {
        Self { label, teardown: Some(Box::new(teardown)) }
    }

    /// Subscription with nothing to tear down.
    #[must_use]
    pub fn detached(label: &'static str) -> Self {
        Self { label, teardown: None }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Unregister the listener.
    pub fn unsubscribe(mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("label", &self.label)
            .field("teardown", &self.teardown.is_some())
            .finish()
    }
}
