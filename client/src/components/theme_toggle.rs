//! Light/dark toggle button.
//!
//! SYSTEM CONTEXT
//! ==============
//! Clicking asks this context's theme controller to flip and persist the
//! theme; the controller then announces it to every other open tab. The
//! icon follows [`ThemeState`], which the controller's change callback keeps
//! current.

use leptos::prelude::*;

use crate::state::theme::ThemeState;

#[component]
pub fn ThemeToggle() -> impl IntoView {
    let theme = expect_context::<RwSignal<ThemeState>>();

    let on_click = move |_| {
        #[cfg(feature = "csr")]
        {
            use switchboard::{InitOptions, ThemeConfig};
            // Already initialized in `start`; this only fetches the handle.
            match switchboard::web::init_browser(ThemeConfig::default(), InitOptions::default()) {
                Ok(handle) => {
                    handle.toggle_theme();
                }
                Err(err) => log::warn!("theme toggle unavailable: {err}"),
            }
        }
    };

    view! {
        <button
            class="btn switchboard__theme-toggle"
            on:click=on_click
            title=move || theme.get().toggle_title()
        >
            {move || theme.get().toggle_icon()}
        </button>
    }
}
