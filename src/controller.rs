//! Synchronization controller.
//!
//! SYSTEM CONTEXT
//! ==============
//! One controller per browsing context. [`ThemeController::init`] moves it
//! from `Uninitialized` to `Active` exactly once:
//!
//! 1. resolve and paint the initial theme synchronously, before returning,
//!    so nothing theme-dependent renders first;
//! 2. open the primary broadcast channel when the runtime allows it;
//! 3. listen for storage mutations from other contexts (always, even with a
//!    working channel, for contexts that never opened one);
//! 4. listen for OS preference changes, which only repaint while no explicit
//!    choice is stored.
//!
//! There is no terminal state; listeners live as long as the context.
//! They hold the shared core weakly, so the embedder must keep the
//! controller or at least one [`ThemeHandle`] alive for the context's
//! lifetime. Browser pages get this from [`crate::web::init_browser`], which
//! parks the controller in a thread-local.
//!
//! DESIGN
//! ======
//! Inbound deliveries (channel message, storage notification, OS change)
//! funnel into the shared core's `apply`. They never write the store and
//! never re-broadcast: only a local `set_theme` persists and announces.
//! Concurrent remote and local changes are last-write-wins at paint time.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::apply::{ThemeApplier, ThemeCallback, ThemeSurface};
use crate::broadcast::{Broadcaster, ChannelRuntime, decode_message};
use crate::config::ThemeConfig;
use crate::os::OsPreferenceSource;
use crate::resolve::{resolve, resolve_raw};
use crate::store::{PreferenceStore, StorageBackend, StorageChange};
use crate::subscription::Subscription;
use crate::theme::Theme;

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

/// Capabilities of the context a controller runs in.
pub struct Environment {
    pub surface: Rc<dyn ThemeSurface>,
    pub storage: Rc<dyn StorageBackend>,
    pub os: Rc<dyn OsPreferenceSource>,
    /// `None` when the runtime has no broadcast channel support at all.
    pub channels: Option<Rc<dyn ChannelRuntime>>,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment").field("channels", &self.channels.is_some()).finish_non_exhaustive()
    }
}

/// Options recognized by [`ThemeController::init`].
#[derive(Clone, Default)]
pub struct InitOptions {
    /// Invoked on every apply: initial, local, and remote-triggered.
    pub on_theme_change: Option<ThemeCallback>,
}

impl InitOptions {
    #[must_use]
    pub fn on_theme_change(callback: impl Fn(Theme) + 'static) -> Self {
        Self { on_theme_change: Some(Rc::new(callback)) }
    }
}

impl std::fmt::Debug for InitOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitOptions").field("on_theme_change", &self.on_theme_change.is_some()).finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Active,
}

/// State shared by the controller, its handles, and its listeners.
struct Core {
    config: ThemeConfig,
    store: PreferenceStore,
    os: Rc<dyn OsPreferenceSource>,
    applier: ThemeApplier,
    broadcaster: Broadcaster,
    subscriptions: RefCell<Vec<Subscription>>,
}

impl std::fmt::Debug for Core {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Core")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("applier", &self.applier)
            .field("broadcaster", &self.broadcaster)
            .field("subscriptions", &self.subscriptions.borrow().len())
            .finish_non_exhaustive()
    }
}

impl Core {
    fn current_theme(&self) -> Theme {
        resolve(self.store.read(), self.os.current(), self.config.default_theme)
    }

    fn set_theme(&self, theme: Theme) {
        if let Err(err) = self.store.write(theme) {
            log::warn!("failed to persist theme {theme}: {err}");
        }
        self.applier.apply(theme);
        self.broadcaster.broadcast(theme);
    }

    fn on_message(&self, raw: &str) {
        let theme = decode_message(raw, self.config.default_theme);
        log::debug!("theme {theme} received over broadcast");
        self.applier.apply(theme);
    }

    fn on_storage_change(&self, change: &StorageChange) {
        if !self.store.is_affected_by(change) {
            return;
        }
        let theme = resolve_raw(change.new_value.as_deref(), self.os.current(), self.config.default_theme);
        log::debug!("theme {theme} received through storage");
        self.applier.apply(theme);
    }

    fn on_os_change(&self, os: Option<Theme>) {
        if let Some(stored) = self.store.read() {
            log::debug!("OS preference changed to {os:?}; explicit choice {stored} stays");
            return;
        }
        self.applier.apply(resolve(None, os, self.config.default_theme));
    }

    /// Wrap a core method as a listener that holds only a weak reference.
    fn listener<T: ?Sized + 'static>(self: &Rc<Self>, f: fn(&Core, &T)) -> impl Fn(&T) + 'static {
        let core: Weak<Core> = Rc::downgrade(self);
        move |arg: &T| {
            if let Some(core) = core.upgrade() {
                f(&core, arg);
            }
        }
    }
}

/// Per-context theme controller.
pub struct ThemeController {
    core: Rc<Core>,
    channels: Option<Rc<dyn ChannelRuntime>>,
    state: Cell<ControllerState>,
}

impl std::fmt::Debug for ThemeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeController")
            .field("core", &self.core)
            .field("channels", &self.channels.is_some())
            .field("state", &self.state.get())
            .finish()
    }
}

impl ThemeController {
    /// Create an uninitialized controller. Nothing is painted or registered yet.
    #[must_use]
    pub fn new(env: Environment, config: ThemeConfig) -> Self {
        let Environment { surface, storage, os, channels } = env;
        let core = Core {
            store: PreferenceStore::new(storage, config.storage_key.clone()),
            applier: ThemeApplier::new(surface, config.attribute.clone(), config.event_name.clone()),
            os,
            broadcaster: Broadcaster::default(),
            subscriptions: RefCell::new(Vec::new()),
            config,
        };
        Self { core: Rc::new(core), channels, state: Cell::new(ControllerState::Uninitialized) }
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.state.get()
    }

    /// The public handle, once active.
    #[must_use]
    pub fn handle(&self) -> Option<ThemeHandle> {
        match self.state.get() {
            ControllerState::Active => Some(ThemeHandle { core: Rc::clone(&self.core) }),
            ControllerState::Uninitialized => None,
        }
    }

    /// Activate the controller. Repeat calls return the same handle and
    /// ignore `options`.
    ///
    /// Listeners stop once the controller and every handle are dropped, so
    /// keep one of them for as long as the context lives.
    #[must_use = "dropping the controller and every handle silences its listeners"]
    pub fn init(&self, options: InitOptions) -> ThemeHandle {
        let handle = ThemeHandle { core: Rc::clone(&self.core) };
        if self.state.get() == ControllerState::Active {
            log::debug!("theme controller already active; ignoring repeat init");
            return handle;
        }
        // Active before the first apply so a re-entrant init from the callback is a no-op.
        self.state.set(ControllerState::Active);

        let core = &self.core;
        core.applier.set_callback(options.on_theme_change);
        core.applier.apply(core.current_theme());

        let mut subscriptions = Vec::new();

        if let Some(channel) = core.broadcaster.connect(self.channels.as_ref(), &core.config.channel_name) {
            let on_message = core.listener(Core::on_message);
            match channel.subscribe(Box::new(on_message)) {
                Ok(subscription) => subscriptions.push(subscription),
                Err(err) => log::warn!("cannot listen on theme broadcast channel: {err}"),
            }
        }

        subscriptions.push(core.store.subscribe(Box::new(core.listener(Core::on_storage_change))));

        let weak = Rc::downgrade(core);
        let on_os_change = move |os: Option<Theme>| {
            if let Some(core) = weak.upgrade() {
                core.on_os_change(os);
            }
        };
        match core.os.subscribe(Box::new(on_os_change)) {
            Some(subscription) => subscriptions.push(subscription),
            None => log::debug!("OS preference changes are not observable; live OS updates disabled"),
        }

        log::debug!(
            "theme controller active ({})",
            subscriptions.iter().map(Subscription::label).collect::<Vec<_>>().join(", ")
        );
        core.subscriptions.borrow_mut().extend(subscriptions);
        handle
    }
}

/// Public control surface of an active controller. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ThemeHandle {
    core: Rc<Core>,
}

impl ThemeHandle {
    /// The theme the resolver produces right now.
    #[must_use]
    pub fn current_theme(&self) -> Theme {
        self.core.current_theme()
    }

    /// Persist, paint, and announce an explicit choice.
    pub fn set_theme(&self, theme: Theme) {
        self.core.set_theme(theme);
    }

    /// Like [`ThemeHandle::set_theme`] for untrusted input; invalid values
    /// become the configured default.
    pub fn set_theme_str(&self, raw: &str) {
        self.core.set_theme(Theme::parse_or(raw, self.core.config.default_theme));
    }

    /// Forget the explicit choice and paint whatever the OS preference (or
    /// the default) resolves to. Other contexts follow through their storage
    /// notification; nothing is broadcast.
    pub fn clear_theme(&self) -> Theme {
        if let Err(err) = self.core.store.clear() {
            log::warn!("failed to clear stored theme: {err}");
        }
        let theme = self.core.current_theme();
        self.core.applier.apply(theme);
        theme
    }

    /// Flip the current theme and store the result as an explicit choice.
    pub fn toggle_theme(&self) -> Theme {
        let next = self.core.current_theme().toggled();
        self.core.set_theme(next);
        next
    }

    #[must_use]
    pub fn config(&self) -> &ThemeConfig {
        &self.core.config
    }

    #[must_use]
    pub fn is_broadcasting(&self) -> bool {
        self.core.broadcaster.is_connected()
    }
}
