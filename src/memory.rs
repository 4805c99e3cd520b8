//! In-memory origin.
//!
//! SYSTEM CONTEXT
//! ==============
//! Models one origin shared by any number of contexts without a browser:
//! a durable key/value map, a named broadcast bus, and an OS preference.
//! Cross-context deliveries are queued and only handed to listeners by
//! [`MemoryOrigin::run_until_idle`], which plays the role of the event loop.
//! Like a browser, storage notifications skip the context that wrote,
//! channel messages skip the channel object that posted, and a storage write
//! that leaves the value unchanged raises no notification.
//!
//! Also used to simulate faults: missing broadcast support, failing sends,
//! and corrupted or foreign values written by some other party.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};

use crate::apply::ThemeSurface;
use crate::broadcast::{BroadcastChannel, ChannelRuntime, MessageHandler, TransportError};
use crate::controller::Environment;
use crate::os::{OsHandler, OsPreferenceSource};
use crate::store::{StorageBackend, StorageChange, StorageHandler, StoreError};
use crate::subscription::Subscription;
use crate::theme::Theme;

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

/// Most recent writes kept by [`MemoryOrigin::storage_writes`].
pub const WRITE_LOG_CAPACITY: usize = 1024;

/// Identifies a context within a [`MemoryOrigin`].
pub type ContextId = u64;

struct Listener<H: ?Sized> {
    id: u64,
    context: ContextId,
    handler: Rc<H>,
}

struct ChannelListener {
    channel: String,
    /// The channel object the listener is attached to.
    endpoint: u64,
    listener: Listener<dyn Fn(&str)>,
}

enum Pending {
    Storage { from: Option<ContextId>, change: StorageChange },
    Message { from: Option<u64>, channel: String, payload: String },
    Os(Option<Theme>),
}

/// A storage write as recorded by the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageWrite {
    /// `None` for writes injected from outside any context.
    pub context: Option<ContextId>,
    pub key: String,
    pub value: Option<String>,
}

#[derive(Default)]
struct OriginState {
    storage: HashMap<String, String>,
    writes: VecDeque<StorageWrite>,
    os: Option<Theme>,
    broadcast_disabled: bool,
    fail_sends: bool,
    next_id: u64,
    storage_listeners: Vec<Listener<dyn Fn(&StorageChange)>>,
    channel_listeners: Vec<ChannelListener>,
    os_listeners: Vec<Listener<dyn Fn(Option<Theme>)>>,
    pending: VecDeque<Pending>,
}

impl OriginState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn write(&mut self, context: Option<ContextId>, key: &str, value: Option<&str>) {
        let previous = match value {
            Some(value) => self.storage.insert(key.to_owned(), value.to_owned()),
            None => self.storage.remove(key),
        };
        if self.writes.len() == WRITE_LOG_CAPACITY {
            self.writes.pop_front();
        }
        self.writes.push_back(StorageWrite { context, key: key.to_owned(), value: value.map(str::to_owned) });
        if previous.as_deref() == value {
            return;
        }
        let change = StorageChange { key: Some(key.to_owned()), new_value: value.map(str::to_owned) };
        self.pending.push_back(Pending::Storage { from: context, change });
    }
}

/// One origin shared by several simulated contexts.
#[derive(Clone, Default)]
pub struct MemoryOrigin {
    state: Rc<RefCell<OriginState>>,
}

impl MemoryOrigin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new context (tab, window, or app) on this origin.
    #[must_use]
    pub fn open_context(&self) -> MemoryContext {
        let id = self.state.borrow_mut().next_id();
        MemoryContext { id, origin: self.clone(), surface: Rc::new(MemorySurface::default()) }
    }

    /// Change the OS preference and queue a notification for OS listeners.
    pub fn set_os_preference(&self, os: Option<Theme>) {
        let mut state = self.state.borrow_mut();
        if state.os != os {
            state.os = os;
            state.pending.push_back(Pending::Os(os));
        }
    }

    #[must_use]
    pub fn os_preference(&self) -> Option<Theme> {
        self.state.borrow().os
    }

    /// Make channel construction fail, as in runtimes without broadcast support.
    pub fn disable_broadcast(&self) {
        self.state.borrow_mut().broadcast_disabled = true;
    }

    /// Make every channel post fail until reset.
    pub fn fail_broadcast_sends(&self, fail: bool) {
        self.state.borrow_mut().fail_sends = fail;
    }

    /// Write a raw value as if some foreign party had done it. Every context is notified.
    pub fn inject_storage(&self, key: &str, raw: Option<&str>) {
        self.state.borrow_mut().write(None, key, raw);
    }

    /// Post a raw payload as if some foreign party had done it.
    pub fn post_raw(&self, channel: &str, raw: &str) {
        self.state.borrow_mut().pending.push_back(Pending::Message {
            from: None,
            channel: channel.to_owned(),
            payload: raw.to_owned(),
        });
    }

    #[must_use]
    pub fn storage_value(&self, key: &str) -> Option<String> {
        self.state.borrow().storage.get(key).cloned()
    }

    /// The most recent writes, oldest first, up to [`WRITE_LOG_CAPACITY`].
    #[must_use]
    pub fn storage_writes(&self) -> Vec<StorageWrite> {
        self.state.borrow().writes.iter().cloned().collect()
    }

    /// Number of queued, undelivered events.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Deliver queued events in FIFO order until the queue is empty.
    ///
    /// Handlers may queue further events; those are delivered too. Returns
    /// the number of events processed.
    pub fn run_until_idle(&self) -> usize {
        let mut processed = 0;
        while let Some(event) = self.pop_event() {
            self.deliver(&event);
            processed += 1;
        }
        processed
    }

    fn pop_event(&self) -> Option<Pending> {
        self.state.borrow_mut().pending.pop_front()
    }

    fn deliver(&self, event: &Pending) {
        // Collect handlers first: they re-enter the origin.
        match event {
            Pending::Storage { from, change } => {
                let handlers: Vec<_> = self
                    .state
                    .borrow()
                    .storage_listeners
                    .iter()
                    .filter(|l| Some(l.context) != *from)
                    .map(|l| Rc::clone(&l.handler))
                    .collect();
                for handler in handlers {
                    handler(change);
                }
            }
            Pending::Message { from, channel, payload } => {
                let handlers: Vec<_> = self
                    .state
                    .borrow()
                    .channel_listeners
                    .iter()
                    .filter(|l| l.channel == *channel && Some(l.endpoint) != *from)
                    .map(|l| Rc::clone(&l.listener.handler))
                    .collect();
                for handler in handlers {
                    handler(payload);
                }
            }
            Pending::Os(os) => {
                let handlers: Vec<_> =
                    self.state.borrow().os_listeners.iter().map(|l| Rc::clone(&l.handler)).collect();
                for handler in handlers {
                    handler(*os);
                }
            }
        }
    }

    fn weak(&self) -> Weak<RefCell<OriginState>> {
        Rc::downgrade(&self.state)
    }
}

impl std::fmt::Debug for MemoryOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MemoryOrigin")
            .field("storage", &state.storage)
            .field("os", &state.os)
            .field("pending", &state.pending.len())
            .finish_non_exhaustive()
    }
}

/// One simulated context on a [`MemoryOrigin`].
#[derive(Debug, Clone)]
pub struct MemoryContext {
    id: ContextId,
    origin: MemoryOrigin,
    surface: Rc<MemorySurface>,
}

impl MemoryContext {
    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    #[must_use]
    pub fn surface(&self) -> &Rc<MemorySurface> {
        &self.surface
    }

    /// The capabilities a controller in this context runs against.
    #[must_use]
    pub fn environment(&self) -> Environment {
        Environment {
            surface: self.surface.clone(),
            storage: Rc::new(MemoryStorage { context: self.id, origin: self.origin.clone() }),
            os: Rc::new(MemoryOs { context: self.id, origin: self.origin.clone() }),
            channels: Some(Rc::new(MemoryChannels { context: self.id, origin: self.origin.clone() })),
        }
    }
}

/// Records what a controller painted.
#[derive(Debug, Default)]
pub struct MemorySurface {
    attributes: RefCell<HashMap<String, Theme>>,
    events: RefCell<Vec<(String, Theme)>>,
}

impl MemorySurface {
    /// Current value of `attribute` on the root element.
    #[must_use]
    pub fn attribute(&self, attribute: &str) -> Option<Theme> {
        self.attributes.borrow().get(attribute).copied()
    }

    /// Themes carried by every notification named `event_name`, oldest first.
    #[must_use]
    pub fn events(&self, event_name: &str) -> Vec<Theme> {
        self.events.borrow().iter().filter(|(name, _)| name == event_name).map(|(_, theme)| *theme).collect()
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }
}

impl ThemeSurface for MemorySurface {
    fn set_theme_attribute(&self, attribute: &str, theme: Theme) {
        self.attributes.borrow_mut().insert(attribute.to_owned(), theme);
    }

    fn dispatch_theme_change(&self, event_name: &str, theme: Theme) {
        self.events.borrow_mut().push((event_name.to_owned(), theme));
    }
}

struct MemoryStorage {
    context: ContextId,
    origin: MemoryOrigin,
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.origin.storage_value(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.origin.state.borrow_mut().write(Some(self.context), key, Some(value));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.origin.state.borrow_mut().write(Some(self.context), key, None);
        Ok(())
    }

    fn subscribe(&self, handler: StorageHandler) -> Subscription {
        let mut state = self.origin.state.borrow_mut();
        let id = state.next_id();
        state.storage_listeners.push(Listener { id, context: self.context, handler: Rc::from(handler) });
        let origin = self.origin.weak();
        Subscription::new("storage", move || {
            if let Some(state) = origin.upgrade() {
                state.borrow_mut().storage_listeners.retain(|l| l.id != id);
            }
        })
    }
}

struct MemoryOs {
    context: ContextId,
    origin: MemoryOrigin,
}

impl OsPreferenceSource for MemoryOs {
    fn current(&self) -> Option<Theme> {
        self.origin.os_preference()
    }

    fn subscribe(&self, handler: OsHandler) -> Option<Subscription> {
        let mut state = self.origin.state.borrow_mut();
        let id = state.next_id();
        state.os_listeners.push(Listener { id, context: self.context, handler: Rc::from(handler) });
        let origin = self.origin.weak();
        Some(Subscription::new("os-preference", move || {
            if let Some(state) = origin.upgrade() {
                state.borrow_mut().os_listeners.retain(|l| l.id != id);
            }
        }))
    }
}

struct MemoryChannels {
    context: ContextId,
    origin: MemoryOrigin,
}

impl ChannelRuntime for MemoryChannels {
    fn open(&self, name: &str) -> Result<Rc<dyn BroadcastChannel>, TransportError> {
        let mut state = self.origin.state.borrow_mut();
        if state.broadcast_disabled {
            return Err(TransportError::Unsupported);
        }
        let endpoint = state.next_id();
        Ok(Rc::new(MemoryChannel {
            context: self.context,
            endpoint,
            name: name.to_owned(),
            origin: self.origin.clone(),
        }))
    }
}

struct MemoryChannel {
    context: ContextId,
    endpoint: u64,
    name: String,
    origin: MemoryOrigin,
}

impl BroadcastChannel for MemoryChannel {
    fn post(&self, payload: &str) -> Result<(), TransportError> {
        let mut state = self.origin.state.borrow_mut();
        if state.fail_sends {
            return Err(TransportError::Send("simulated send failure".to_owned()));
        }
        state.pending.push_back(Pending::Message {
            from: Some(self.endpoint),
            channel: self.name.clone(),
            payload: payload.to_owned(),
        });
        Ok(())
    }

    fn subscribe(&self, handler: MessageHandler) -> Result<Subscription, TransportError> {
        let mut state = self.origin.state.borrow_mut();
        let id = state.next_id();
        state.channel_listeners.push(ChannelListener {
            channel: self.name.clone(),
            endpoint: self.endpoint,
            listener: Listener { id, context: self.context, handler: Rc::from(handler) },
        });
        let origin = self.origin.weak();
        Ok(Subscription::new("broadcast", move || {
            if let Some(state) = origin.upgrade() {
                state.borrow_mut().channel_listeners.retain(|l| l.listener.id != id);
            }
        }))
    }
}
