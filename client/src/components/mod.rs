//! Dashboard shell components.

pub mod service_list;
pub mod theme_toggle;
