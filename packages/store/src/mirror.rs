//! # Local mirror — durable on-device copy of the saved set
//!
//! [`LocalMirror`] serialises the whole saved-items set, together with the
//! journal of remote writes that have not been delivered yet, into one JSON
//! blob stored under a fixed key of a [`KeyValueStore`]. Every save rewrites the
//! entire document; there is no partial update, locking or versioning, so two
//! writers sharing the key clobber each other (last write wins).
//!
//! ## Blob format
//!
//! ```json
//! { "owner": "<user id>", "items": [ { "item_name": "Chair", ... } ], "pending": [ ... ] }
//! ```
//!
//! `owner` is the user the set belongs to. A reader must not hand one user's
//! snapshot to another; see [`MirrorSnapshot::belongs_to`].
//!
//! A bare JSON array of items (the format written by earlier clients) is also
//! accepted on read and treated as a snapshot with an empty journal.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::kv::KeyValueStore;
use crate::models::{PendingOp, SavedItem};

/// The decoded content of the mirror blob.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MirrorSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub items: Vec<SavedItem>,
    #[serde(default)]
    pub pending: Vec<PendingOp>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredBlob {
    Snapshot(MirrorSnapshot),
    Legacy(Vec<SavedItem>),
}

impl From<StoredBlob> for MirrorSnapshot {
    fn from(blob: StoredBlob) -> Self {
        match blob {
            StoredBlob::Snapshot(snapshot) => snapshot,
            StoredBlob::Legacy(items) => MirrorSnapshot {
                owner: None,
                items,
                pending: Vec::new(),
            },
        }
    }
}

impl MirrorSnapshot {
    /// Whether this snapshot may be shown to `user_id`. Snapshots written
    /// without an owner predate per-user mirrors and are accepted.
    pub fn belongs_to(&self, user_id: &str) -> bool {
        self.owner.as_deref().is_none_or(|owner| owner == user_id)
    }
}

#[derive(Serialize)]
struct StoredBlobRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<&'a str>,
    items: &'a [SavedItem],
    pending: &'a [PendingOp],
}

/// Whole-document mirror of the saved set, keyed by a fixed name.
#[derive(Clone, Debug)]
pub struct LocalMirror<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> LocalMirror<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the stored snapshot. Returns `None` if nothing is stored or the
    /// blob cannot be decoded.
    pub fn load(&self) -> Option<MirrorSnapshot> {
        let raw = self.store.get(&self.key)?;
        match serde_json::from_str::<StoredBlob>(&raw) {
            Ok(blob) => Some(blob.into()),
            Err(e) => {
                tracing::warn!(key = %self.key, "Discarding unreadable local mirror: {e}");
                None
            }
        }
    }

    /// Replace the stored snapshot with `owner`'s `items` and `pending`.
    pub fn save(
        &self,
        owner: Option<&str>,
        items: &[SavedItem],
        pending: &[PendingOp],
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&StoredBlobRef {
            owner,
            items,
            pending,
        })?;
        self.store.set(&self.key, &raw)
    }

    /// Drop the stored snapshot.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(&self.key)
    }
}
