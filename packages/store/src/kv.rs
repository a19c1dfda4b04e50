//! # Key-value storage — the on-device persistence seam
//!
//! Everything the client keeps on the device (the saved-products mirror, the
//! auth session, the theme preference) is a single string stored under a fixed
//! key. [`KeyValueStore`] is the trait the rest of the workspace talks to, so the
//! same logic runs against browser `localStorage` ([`crate::LocalStorageStore`]),
//! plain files ([`crate::FileStore`]) or an in-memory map ([`crate::MemoryStore`]).
//!
//! ## Semantics
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`get`](KeyValueStore::get) | Returns the stored string, or `None` when the key is absent or unreadable. |
//! | [`set`](KeyValueStore::set) | Replaces the whole value for the key. Last write wins. |
//! | [`remove`](KeyValueStore::remove) | Deletes the key. Removing a missing key is not an error. |
//!
//! Writes are synchronous from the caller's point of view: once `set` returns
//! the value has been handed to the backing store. There is no locking or
//! versioning across processes or browser tabs.

use crate::error::StoreError;

/// Synchronous string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
