//! Client-side state modules.

pub mod theme;
