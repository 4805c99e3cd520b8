//! Browser bindings.
//!
//! SYSTEM CONTEXT
//! ==============
//! Implements the controller's capabilities on `web-sys`: the root element
//! attribute plus a `CustomEvent` on `document`, `localStorage` with its
//! `storage` event, `matchMedia("(prefers-color-scheme: dark)")`, and
//! `BroadcastChannel`. Pages either call [`init_browser`] from Rust before
//! mounting anything, or call the exported `initTheme` from a blocking
//! script in `<head>` so the first paint already has the right theme.
//!
//! ERROR HANDLING
//! ==============
//! Missing `window`/`document` is an error for the caller. Every other
//! missing API degrades: no `localStorage` reads as "no stored choice", no
//! `matchMedia` means no OS signal, no `BroadcastChannel` leaves only the
//! storage path.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::apply::{ThemeCallback, ThemeSurface};
use crate::broadcast::{BroadcastChannel, ChannelRuntime, MessageHandler, TransportError};
use crate::config::{ConfigError, ThemeConfig};
use crate::controller::{Environment, InitOptions, ThemeController, ThemeHandle};
use crate::os::{FixedOsPreference, OsHandler, OsPreferenceSource};
use crate::store::{StorageBackend, StorageChange, StorageHandler, StoreError, UnavailableStorage};
use crate::subscription::Subscription;
use crate::theme::Theme;

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";
const LIGHT_QUERY: &str = "(prefers-color-scheme: light)";

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("browser API unavailable: {0}")]
    Missing(&'static str),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

thread_local! {
    static CONTROLLER: RefCell<Option<ThemeController>> = const { RefCell::new(None) };
}

/// Render a thrown JS value for logs.
fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

// =============================================================
// Document
// =============================================================

pub struct DocumentSurface {
    document: web_sys::Document,
}

impl DocumentSurface {
    #[must_use]
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }
}

impl ThemeSurface for DocumentSurface {
    fn set_theme_attribute(&self, attribute: &str, theme: Theme) {
        let Some(root) = self.document.document_element() else {
            log::warn!("no root element to carry {attribute}");
            return;
        };
        if let Err(err) = root.set_attribute(attribute, theme.as_str()) {
            log::warn!("failed to set {attribute}={theme}: {}", describe(&err));
        }
    }

    fn dispatch_theme_change(&self, event_name: &str, theme: Theme) {
        let detail = js_sys::Object::new();
        let set = js_sys::Reflect::set(&detail, &JsValue::from_str("theme"), &JsValue::from_str(theme.as_str()));
        if let Err(err) = set {
            log::warn!("failed to build {event_name} detail: {}", describe(&err));
            return;
        }
        let init = web_sys::CustomEventInit::new();
        init.set_detail(&detail);
        let event = match web_sys::CustomEvent::new_with_event_init_dict(event_name, &init) {
            Ok(event) => event,
            Err(err) => {
                log::warn!("failed to create {event_name} event: {}", describe(&err));
                return;
            }
        };
        if let Err(err) = self.document.dispatch_event(&event) {
            log::warn!("failed to dispatch {event_name}: {}", describe(&err));
        }
    }
}

// =============================================================
// localStorage
// =============================================================

pub struct LocalStorage {
    window: web_sys::Window,
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn new(window: &web_sys::Window) -> Result<Self, WebError> {
        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self { window: window.clone(), storage }),
            Ok(None) | Err(_) => Err(WebError::Missing("localStorage")),
        }
    }
}

impl StorageBackend for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(|err| StoreError::Backend(describe(&err)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(|err| StoreError::Backend(describe(&err)))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage.remove_item(key).map_err(|err| StoreError::Backend(describe(&err)))
    }

    fn subscribe(&self, handler: StorageHandler) -> Subscription {
        let storage = self.storage.clone();
        let closure = Closure::<dyn FnMut(web_sys::StorageEvent)>::new(move |event: web_sys::StorageEvent| {
            // sessionStorage mutations raise the same event.
            if event.storage_area().is_some_and(|area| area != storage) {
                return;
            }
            handler(&StorageChange { key: event.key(), new_value: event.new_value() });
        });
        if let Err(err) = self.window.add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref()) {
            log::warn!("cannot observe storage events: {}", describe(&err));
            return Subscription::detached("storage");
        }
        let window = self.window.clone();
        Subscription::new("storage", move || {
            if let Err(err) = window.remove_event_listener_with_callback("storage", closure.as_ref().unchecked_ref()) {
                log::debug!("failed to remove storage listener: {}", describe(&err));
            }
        })
    }
}

// =============================================================
// prefers-color-scheme
// =============================================================

pub struct MediaQueryPreference {
    dark: web_sys::MediaQueryList,
    light: Option<web_sys::MediaQueryList>,
}

impl MediaQueryPreference {
    /// `None` when `matchMedia` is unavailable.
    #[must_use]
    pub fn new(window: &web_sys::Window) -> Option<Self> {
        let dark = match window.match_media(DARK_QUERY) {
            Ok(Some(list)) => list,
            Ok(None) | Err(_) => return None,
        };
        let light = match window.match_media(LIGHT_QUERY) {
            Ok(list) => list,
            Err(_) => None,
        };
        Some(Self { dark, light })
    }

    fn evaluate(dark: &web_sys::MediaQueryList, light: Option<&web_sys::MediaQueryList>) -> Option<Theme> {
        if dark.matches() {
            Some(Theme::Dark)
        } else if light.is_some_and(web_sys::MediaQueryList::matches) {
            Some(Theme::Light)
        } else {
            None
        }
    }
}

impl OsPreferenceSource for MediaQueryPreference {
    fn current(&self) -> Option<Theme> {
        Self::evaluate(&self.dark, self.light.as_ref())
    }

    /// Listens on both queries: leaving dark only fires on the dark list,
    /// leaving light for "no preference" only fires on the light list.
    fn subscribe(&self, handler: OsHandler) -> Option<Subscription> {
        let dark = self.dark.clone();
        let light = self.light.clone();
        let closure = Closure::<dyn FnMut(web_sys::MediaQueryListEvent)>::new(move |_: web_sys::MediaQueryListEvent| {
            handler(Self::evaluate(&dark, light.as_ref()));
        });
        if let Err(err) = self.dark.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref()) {
            log::debug!("prefers-color-scheme changes not observable: {}", describe(&err));
            return None;
        }
        let mut lists = vec![self.dark.clone()];
        if let Some(light) = &self.light {
            match light.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref()) {
                Ok(()) => lists.push(light.clone()),
                Err(err) => log::debug!("light scheme changes not observable: {}", describe(&err)),
            }
        }
        Some(Subscription::new("os-preference", move || {
            for list in &lists {
                if let Err(err) = list.remove_event_listener_with_callback("change", closure.as_ref().unchecked_ref()) {
                    log::debug!("failed to remove media query listener: {}", describe(&err));
                }
            }
        }))
    }
}

// =============================================================
// BroadcastChannel
// =============================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct BroadcastChannelRuntime;

impl BroadcastChannelRuntime {
    /// Whether `window` exposes the `BroadcastChannel` constructor.
    #[must_use]
    pub fn is_supported(window: &web_sys::Window) -> bool {
        matches!(js_sys::Reflect::has(window, &JsValue::from_str("BroadcastChannel")), Ok(true))
    }
}

impl ChannelRuntime for BroadcastChannelRuntime {
    fn open(&self, name: &str) -> Result<Rc<dyn BroadcastChannel>, TransportError> {
        let channel = web_sys::BroadcastChannel::new(name).map_err(|err| TransportError::Open(describe(&err)))?;
        Ok(Rc::new(WebChannel { channel }))
    }
}

struct WebChannel {
    channel: web_sys::BroadcastChannel,
}

impl BroadcastChannel for WebChannel {
    fn post(&self, payload: &str) -> Result<(), TransportError> {
        let message = js_sys::JSON::parse(payload).map_err(|_| TransportError::Encode)?;
        self.channel.post_message(&message).map_err(|err| TransportError::Send(describe(&err)))
    }

    fn subscribe(&self, handler: MessageHandler) -> Result<Subscription, TransportError> {
        let closure = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(move |event: web_sys::MessageEvent| {
            // Unserializable data decodes as malformed.
            let raw = match js_sys::JSON::stringify(&event.data()) {
                Ok(raw) => String::from(raw),
                Err(_) => String::new(),
            };
            handler(&raw);
        });
        self.channel
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            .map_err(|err| TransportError::Open(describe(&err)))?;
        let channel = self.channel.clone();
        Ok(Subscription::new("broadcast", move || {
            if let Err(err) = channel.remove_event_listener_with_callback("message", closure.as_ref().unchecked_ref()) {
                log::debug!("failed to remove broadcast listener: {}", describe(&err));
            }
            channel.close();
        }))
    }
}

// =============================================================
// Wiring
// =============================================================

impl Environment {
    /// Capabilities of the current browsing context.
    pub fn browser() -> Result<Self, WebError> {
        let window = web_sys::window().ok_or(WebError::Missing("window"))?;
        let document = window.document().ok_or(WebError::Missing("document"))?;

        let storage: Rc<dyn StorageBackend> = match LocalStorage::new(&window) {
            Ok(storage) => Rc::new(storage),
            Err(err) => {
                log::warn!("{err}; theme choices will not persist");
                Rc::new(UnavailableStorage)
            }
        };
        let os: Rc<dyn OsPreferenceSource> = match MediaQueryPreference::new(&window) {
            Some(query) => Rc::new(query),
            None => Rc::new(FixedOsPreference(None)),
        };

        let channels: Option<Rc<dyn ChannelRuntime>> = if BroadcastChannelRuntime::is_supported(&window) {
            Some(Rc::new(BroadcastChannelRuntime))
        } else {
            log::warn!("BroadcastChannel unsupported; other tabs follow through storage events only");
            None
        };

        Ok(Self { surface: Rc::new(DocumentSurface::new(document)), storage, os, channels })
    }
}

/// Initialize (once) the controller for this browsing context.
///
/// Later calls return the existing handle; their config and options are ignored.
pub fn init_browser(config: ThemeConfig, options: InitOptions) -> Result<ThemeHandle, WebError> {
    if let Some(handle) = CONTROLLER.with(|slot| slot.borrow().as_ref().and_then(ThemeController::handle)) {
        log::debug!("theme controller already initialized for this context");
        return Ok(handle);
    }
    config.validate()?;
    let controller = ThemeController::new(Environment::browser()?, config);
    CONTROLLER.with(|slot| *slot.borrow_mut() = Some(controller));
    // Shared borrow only: the change callback may call back in here.
    CONTROLLER
        .with(|slot| slot.borrow().as_ref().map(|controller| controller.init(options)))
        .ok_or(WebError::Missing("theme controller"))
}

// =============================================================
// JS exports
// =============================================================

/// Handle returned to page scripts by `initTheme`.
#[wasm_bindgen(js_name = ThemeSync)]
pub struct JsThemeHandle {
    handle: ThemeHandle,
}

#[wasm_bindgen(js_class = ThemeSync)]
impl JsThemeHandle {
    #[wasm_bindgen(js_name = getCurrentTheme)]
    #[must_use]
    pub fn get_current_theme(&self) -> String {
        self.handle.current_theme().as_str().to_owned()
    }

    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&self, theme: &str) {
        self.handle.set_theme_str(theme);
    }

    #[wasm_bindgen(js_name = toggleTheme)]
    pub fn toggle_theme(&self) -> String {
        self.handle.toggle_theme().as_str().to_owned()
    }

    #[wasm_bindgen(js_name = clearTheme)]
    pub fn clear_theme(&self) -> String {
        self.handle.clear_theme().as_str().to_owned()
    }
}

/// `initTheme(configJson?, onThemeChange?)` for plain page scripts.
#[wasm_bindgen(js_name = initTheme)]
pub fn init_theme(
    config_json: Option<String>,
    on_theme_change: Option<js_sys::Function>,
) -> Result<JsThemeHandle, JsValue> {
    let config = match config_json {
        Some(raw) => ThemeConfig::from_json(&raw).map_err(|err| JsValue::from_str(&err.to_string()))?,
        None => ThemeConfig::default(),
    };
    let on_theme_change = on_theme_change.map(|callback| -> ThemeCallback {
        Rc::new(move |theme: Theme| {
            if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(theme.as_str())) {
                log::warn!("onThemeChange threw: {}", describe(&err));
            }
        })
    });
    init_browser(config, InitOptions { on_theme_change })
        .map(|handle| JsThemeHandle { handle })
        .map_err(|err| JsValue::from_str(&err.to_string()))
}
