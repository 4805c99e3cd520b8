//! Durable preference store.
//!
//! SYSTEM CONTEXT
//! ==============
//! The store is the only shared mutable resource between contexts. It holds
//! at most one value, the user's explicit choice, under a single key. Writes
//! are whole-value overwrites and last write wins. Backends also deliver
//! storage-mutation notifications raised by other contexts, which the
//! controller uses as the fallback cross-context path.
//!
//! ERROR HANDLING
//! ==============
//! Reads never fail from the caller's point of view: an unavailable backend
//! or a foreign value reads as "no stored choice".

use std::rc::Rc;

use crate::subscription::Subscription;
use crate::theme::Theme;

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("storage is unavailable in this context")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A key change observed in another context sharing the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    /// `None` when the whole storage area was cleared.
    pub key: Option<String>,
    /// `None` when the key was removed.
    pub new_value: Option<String>,
}

/// Callback invoked for each storage-mutation notification.
pub type StorageHandler = Box<dyn Fn(&StorageChange)>;

/// Origin-scoped string key/value persistence.
pub trait StorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    /// Observe mutations made by *other* contexts.
    fn subscribe(&self, handler: StorageHandler) -> Subscription;
}

/// Typed view of the single stored-choice entry.
#[derive(Clone)]
pub struct PreferenceStore {
    backend: Rc<dyn StorageBackend>,
    key: String,
}

impl PreferenceStore {
    pub fn new(backend: Rc<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self { backend, key: key.into() }
    }

    /// The stored choice, or `None` when absent, foreign, or unreadable.
    #[must_use]
    pub fn read(&self) -> Option<Theme> {
        let raw = match self.backend.get(&self.key) {
            Ok(raw) => raw?,
            Err(err) => {
                log::warn!("theme store read failed: {err}");
                return None;
            }
        };
        match Theme::parse(&raw) {
            Ok(theme) => Some(theme),
            Err(err) => {
                log::warn!("ignoring stored theme under {:?}: {err}", self.key);
                None
            }
        }
    }

    pub fn write(&self, theme: Theme) -> Result<(), StoreError> {
        self.backend.set(&self.key, theme.as_str())
    }

    /// Forget the stored choice so the OS preference governs again.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.backend.remove(&self.key)
    }

    /// Whether `change` concerns the stored-choice entry.
    #[must_use]
    pub fn is_affected_by(&self, change: &StorageChange) -> bool {
        change.key.as_deref().is_none_or(|key| key == self.key)
    }

    /// Observe stored-choice mutations made by other contexts.
    pub fn subscribe(&self, handler: StorageHandler) -> Subscription {
        self.backend.subscribe(handler)
    }
}

/// Backend for runtimes without durable storage. Reads are absent, writes fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStorage;

impl StorageBackend for UnavailableStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    fn subscribe(&self, _handler: StorageHandler) -> Subscription {
        Subscription::detached("storage")
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore").field("key", &self.key).finish_non_exhaustive()
    }
}
