//! Root application component.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};

use crate::components::service_list::ServiceList;
use crate::components::theme_toggle::ThemeToggle;
use crate::state::theme::ThemeState;

/// Root application component.
///
/// `theme` is created before mounting so the controller's initial apply can
/// land in it; it is provided as context for the toggle.
#[component]
pub fn App(theme: RwSignal<ThemeState>) -> impl IntoView {
    provide_meta_context();
    provide_context(theme);

    view! {
        <Title text="Switchboard"/>

        <header class="switchboard__header">
            <span class="switchboard__title">"Switchboard"</span>
            <span class="switchboard__spacer"></span>
            <ThemeToggle/>
        </header>

        <main class="switchboard__main">
            <ServiceList/>
        </main>
    }
}
