//! Links to the services the dashboard aggregates.
//!
//! Liveness polling is owned by the hosting page; this list only renders
//! the fixed set of destinations.

use leptos::prelude::*;

#[cfg(test)]
#[path = "service_list_test.rs"]
mod service_list_test;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Service {
    pub name: &'static str,
    pub url: &'static str,
    pub summary: &'static str,
}

pub const SERVICES: &[Service] = &[
    Service { name: "Grafana", url: "/grafana/", summary: "Metrics dashboards" },
    Service { name: "Jellyfin", url: "/jellyfin/", summary: "Media library" },
    Service { name: "Gitea", url: "/git/", summary: "Source hosting" },
    Service { name: "Home Assistant", url: "/home/", summary: "Home automation" },
];

#[component]
pub fn ServiceList() -> impl IntoView {
    view! {
        <ul class="switchboard__services">
            {SERVICES
                .iter()
                .map(|service| {
                    view! {
                        <li class="switchboard__service">
                            <a href=service.url>{service.name}</a>
                            <span class="switchboard__service-summary">{service.summary}</span>
                        </li>
                    }
                })
                .collect_view()}
        </ul>
    }
}
