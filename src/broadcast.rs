//! Cross-context broadcast.
//!
//! SYSTEM CONTEXT
//! ==============
//! A theme change made in one context reaches the others over two paths:
//! the named real-time channel handled here, and the storage-mutation
//! notification raised by the store write (see [`crate::store`]). Both carry
//! the same information and both end in the controller's single inbound
//! handler. Delivery is best-effort and at-least-once; receivers apply what
//! they get and never re-broadcast.
//!
//! ERROR HANDLING
//! ==============
//! Channel construction or send failures are logged and swallowed. The
//! storage path still converges every context that observes storage.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::subscription::Subscription;
use crate::theme::Theme;

#[cfg(test)]
#[path = "broadcast_test.rs"]
mod broadcast_test;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("broadcast channels are not supported by this runtime")]
    Unsupported,
    #[error("failed to open broadcast channel: {0}")]
    Open(String),
    #[error("failed to post broadcast message: {0}")]
    Send(String),
    #[error("failed to encode broadcast message")]
    Encode,
}

/// Payload carried on the channel: `{"theme":"dark"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeMessage {
    pub theme: Theme,
}

impl ThemeMessage {
    pub fn encode(&self) -> Result<String, TransportError> {
        serde_json::to_string(self).map_err(|_| TransportError::Encode)
    }
}

/// Decode an inbound payload. Malformed input yields `default` with a warning.
#[must_use]
pub fn decode_message(raw: &str, default: Theme) -> Theme {
    match serde_json::from_str::<ThemeMessage>(raw) {
        Ok(message) => message.theme,
        Err(err) => {
            log::warn!("malformed theme broadcast {raw:?} ({err}); applying {default}");
            default
        }
    }
}

/// Callback invoked with the raw payload of each inbound message.
pub type MessageHandler = Box<dyn Fn(&str)>;

/// An open same-origin channel.
pub trait BroadcastChannel {
    fn post(&self, payload: &str) -> Result<(), TransportError>;
    /// Observe messages posted by *other* contexts.
    fn subscribe(&self, handler: MessageHandler) -> Result<Subscription, TransportError>;
}

/// Runtime capability for opening channels.
pub trait ChannelRuntime {
    fn open(&self, name: &str) -> Result<Rc<dyn BroadcastChannel>, TransportError>;
}

/// Owns the primary channel, when one could be opened.
#[derive(Default)]
pub struct Broadcaster {
    primary: RefCell<Option<Rc<dyn BroadcastChannel>>>,
}

impl Broadcaster {
    /// Open `name` on `runtime`. Failure leaves the broadcaster without a
    /// primary channel and is not an error for the caller.
    pub fn connect(&self, runtime: Option<&Rc<dyn ChannelRuntime>>, name: &str) -> Option<Rc<dyn BroadcastChannel>> {
        let opened = match runtime {
            Some(runtime) => runtime.open(name),
            None => Err(TransportError::Unsupported),
        };
        match opened {
            Ok(channel) => {
                *self.primary.borrow_mut() = Some(Rc::clone(&channel));
                Some(channel)
            }
            Err(err) => {
                log::warn!("theme broadcast channel {name:?} unavailable: {err}; relying on storage notifications");
                None
            }
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.primary.borrow().is_some()
    }

    /// Post `theme` on the primary channel, if any.
    pub fn broadcast(&self, theme: Theme) {
        let Some(channel) = self.primary.borrow().clone() else {
            return;
        };
        let message = ThemeMessage { theme };
        if let Err(err) = message.encode().and_then(|payload| channel.post(&payload)) {
            log::warn!("theme broadcast failed: {err}");
        }
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster").field("connected", &self.is_connected()).finish()
    }
}
