//! # Browser localStorage store — web-side persistence
//!
//! [`LocalStorageStore`] is the [`KeyValueStore`] used on the **web platform**.
//! It reads and writes the window's `localStorage` through `web-sys`, giving the
//! client a durable per-origin copy of the saved set and session.
//!
//! ## Namespacing
//!
//! An optional prefix is prepended to every key (`"<prefix>:<key>"`) so several
//! users on one browser profile do not share a mirror.
//!
//! ## Error handling
//!
//! Reads swallow errors and return `None`: a disabled or full storage degrades to
//! "nothing stored locally". Writes report [`StoreError`] so callers can log the
//! failure.

use crate::error::StoreError;
use crate::kv::KeyValueStore;

/// `window.localStorage`-backed KeyValueStore for the web platform.
#[derive(Clone, Debug, Default)]
pub struct LocalStorageStore {
    prefix: Option<String>,
}

impl LocalStorageStore {
    /// Create an unscoped store.
    pub fn new() -> Self {
        Self::with_namespace(None)
    }

    /// Create a store whose keys are scoped to an optional namespace.
    pub fn with_namespace(namespace: Option<&str>) -> Self {
        Self {
            prefix: namespace.map(str::to_string),
        }
    }

    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{key}"),
            None => key.to_string(),
        }
    }

    fn storage() -> Result<web_sys::Storage, StoreError> {
        let window =
            web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".to_string()))?;
        window
            .local_storage()
            .map_err(|_| StoreError::Unavailable("localStorage access denied".to_string()))?
            .ok_or_else(|| StoreError::Unavailable("localStorage missing".to_string()))
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        let storage = Self::storage().ok()?;
        storage.get_item(&self.full_key(key)).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let full_key = self.full_key(key);
        Self::storage()?
            .set_item(&full_key, value)
            .map_err(|e| StoreError::Write {
                key: full_key,
                reason: format!("{e:?}"),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let full_key = self.full_key(key);
        Self::storage()?
            .remove_item(&full_key)
            .map_err(|e| StoreError::Write {
                key: full_key,
                reason: format!("{e:?}"),
            })
    }
}
