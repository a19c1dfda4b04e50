use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::StoreError;
use crate::kv::KeyValueStore;

/// In-memory KeyValueStore for testing and native fallback.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::LocalMirror;
    use crate::models::{PendingKind, PendingOp, SavedItem};

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get("theme").is_none());

        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("dark"));

        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("light"));

        store.remove("theme").unwrap();
        assert!(store.get("theme").is_none());
        // Removing again is fine
        store.remove("theme").unwrap();
    }

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(other.get("k").as_deref(), Some("v"));
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_mirror_over_memory_store() {
        let store = MemoryStore::new();
        let mirror = LocalMirror::new(store.clone(), "savedProducts");

        // Nothing stored yet
        assert!(mirror.load().is_none());

        let items = vec![SavedItem::named("Chair"), SavedItem::named("Lamp")];
        let pending = vec![PendingOp::new(PendingKind::Upsert, "p1", "u1")];
        mirror.save(Some("u1"), &items, &pending).unwrap();

        let snapshot = mirror.load().unwrap();
        assert_eq!(snapshot.items, items);
        assert_eq!(snapshot.pending, pending);

        // The blob lives under the fixed key
        assert!(store.get("savedProducts").is_some());

        mirror.clear().unwrap();
        assert!(mirror.load().is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let store = MemoryStore::new();
        let tab_a = LocalMirror::new(store.clone(), "savedProducts");
        let tab_b = LocalMirror::new(store.clone(), "savedProducts");

        tab_a.save(None, &[SavedItem::named("Chair")], &[]).unwrap();
        tab_b.save(None, &[SavedItem::named("Desk")], &[]).unwrap();

        let snapshot = tab_a.load().unwrap();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].item_name, "Desk");
    }
}
