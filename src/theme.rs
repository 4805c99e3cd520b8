//! Theme value type.
//!
//! Only the literals `"dark"` and `"light"` are legal anywhere a theme
//! crosses a boundary (storage, broadcast payloads, page input). Anything
//! else is rejected here so the rest of the crate only ever sees [`Theme`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

/// Error returned when a raw string is not a legal theme.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThemeError {
    #[error("invalid theme value: {0:?} (expected \"dark\" or \"light\")")]
    Invalid(String),
}

/// The two themes a document can be painted with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Hard default used when neither a stored choice nor an OS signal exists.
    pub const DEFAULT: Theme = Theme::Dark;

    /// Parse the exact wire literal.
    ///
    /// No trimming or case folding: `"Dark"` and `" dark"` are foreign values.
    pub fn parse(raw: &str) -> Result<Self, ThemeError> {
        match raw {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(ThemeError::Invalid(other.to_owned())),
        }
    }

    /// Parse, substituting `default` (with a warning) for invalid input.
    #[must_use]
    pub fn parse_or(raw: &str, default: Self) -> Self {
        Self::parse(raw).unwrap_or_else(|err| {
            log::warn!("{err}; falling back to {default}");
            default
        })
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// The opposite theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    #[must_use]
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

impl FromStr for Theme {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
