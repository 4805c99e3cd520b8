//! Controller configuration.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every context on an origin must agree on the storage key and channel
//! name, otherwise they silently stop converging. The defaults below are the
//! dashboard's well-known names; pages only override them when several
//! independent dashboards share one origin.

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_STORAGE_KEY: &str = "switchboard-theme";
pub const DEFAULT_CHANNEL_NAME: &str = "switchboard-theme";
pub const DEFAULT_ATTRIBUTE: &str = "data-theme";
pub const DEFAULT_EVENT_NAME: &str = "themechange";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse theme config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("theme config field `{0}` must not be empty")]
    EmptyField(&'static str),
}

/// Names and defaults shared by every context on the origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Key of the single stored-choice entry.
    pub storage_key: String,
    /// Well-known broadcast channel name.
    pub channel_name: String,
    /// Root element attribute carrying the effective theme.
    pub attribute: String,
    /// Document-level notification fired on every apply.
    pub event_name: String,
    /// Theme used when nothing else resolves.
    pub default_theme: Theme,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            channel_name: DEFAULT_CHANNEL_NAME.to_owned(),
            attribute: DEFAULT_ATTRIBUTE.to_owned(),
            event_name: DEFAULT_EVENT_NAME.to_owned(),
            default_theme: Theme::DEFAULT,
        }
    }
}

impl ThemeConfig {
    /// Parse a (possibly partial) JSON object; missing fields take defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("storage_key", &self.storage_key),
            ("channel_name", &self.channel_name),
            ("attribute", &self.attribute),
            ("event_name", &self.event_name),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(ConfigError::EmptyField(*name)),
            None => Ok(()),
        }
    }
}
