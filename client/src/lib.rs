//! # switchboard-client
//!
//! Leptos + WASM shell for the switchboard dashboard: a header with the
//! theme toggle and links to the services the dashboard aggregates.
//!
//! The theme controller from the `switchboard` crate is initialized in
//! [`start`] before anything is mounted, so the first rendered frame already
//! carries the resolved `data-theme`.

pub mod app;
pub mod components;
pub mod state;

/// WASM entry point.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    use leptos::prelude::*;
    use switchboard::{InitOptions, ThemeConfig};

    use crate::app::App;
    use crate::state::theme::ThemeState;

    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let theme = RwSignal::new(ThemeState::default());
    let options = InitOptions::on_theme_change(move |applied| theme.update(|t| t.record(applied)));
    if let Err(err) = switchboard::web::init_browser(ThemeConfig::default(), options) {
        log::warn!("theme sync unavailable: {err}");
    }

    leptos::mount::mount_to_body(move || view! { <App theme=theme/> });
}
