//! Cross-context light/dark theme synchronization for the switchboard
//! dashboard.
//!
//! Every browsing context (tab, window, separately hosted app on the same
//! origin) runs its own [`controller::ThemeController`]. Contexts share no
//! memory; they converge through the durable preference store and a named
//! broadcast channel. The browser bindings live in [`web`] behind the `web`
//! feature; everything else is plain Rust and is exercised in tests through
//! the [`memory`] origin simulator.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`theme`] | The `Theme` value type and its parsing rules |
//! | [`config`] | Storage key, channel name, attribute and event names |
//! | [`store`] | Durable preference store over a key/value backend |
//! | [`resolve`] | Pure precedence resolver (stored → OS → default) |
//! | [`apply`] | Paints the effective theme and notifies observers |
//! | [`broadcast`] | Wire payload and the primary broadcast path |
//! | [`os`] | OS-level light/dark signal |
//! | [`subscription`] | Listener handles held by the controller |
//! | [`controller`] | Startup wiring and the public get/set/toggle surface |
//! | [`memory`] | In-memory origin used by tests and non-browser hosts |
//! | `web` | `web-sys` implementations (feature `web`) |

pub mod apply;
pub mod broadcast;
pub mod config;
pub mod controller;
pub mod memory;
pub mod os;
pub mod resolve;
pub mod store;
pub mod subscription;
pub mod theme;
#[cfg(feature = "web")]
pub mod web;

pub use config::ThemeConfig;
pub use controller::{Environment, InitOptions, ThemeController, ThemeHandle};
pub use theme::Theme;
