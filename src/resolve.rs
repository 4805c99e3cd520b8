//! Effective-theme resolution.
//!
//! Precedence is explicit stored choice, then the OS preference, then the
//! configured default. No I/O; an invalid raw value is only logged.

use crate::theme::Theme;

#[cfg(test)]
#[path = "resolve_test.rs"]
mod resolve_test;

/// Compute the effective theme from the three signal sources.
#[must_use]
pub fn resolve(stored: Option<Theme>, os: Option<Theme>, default: Theme) -> Theme {
    stored.or(os).unwrap_or(default)
}

/// Like [`resolve`], but takes the raw stored string; invalid values count as absent.
#[must_use]
pub fn resolve_raw(stored: Option<&str>, os: Option<Theme>, default: Theme) -> Theme {
    let stored = match stored.map(Theme::parse) {
        Some(Ok(theme)) => Some(theme),
        Some(Err(err)) => {
            log::warn!("treating stored theme as absent: {err}");
            None
        }
        None => None,
    };
    resolve(stored, os, default)
}
