//! # Domain models for saved marketplace items
//!
//! Defines the data structures kept in the local mirror and exchanged with the
//! remote store. These types are `Serialize + Deserialize` so the same shape is
//! written to device storage and decoded from remote rows.
//!
//! ## Types
//!
//! | Struct | Represents |
//! |--------|-----------|
//! | [`SavedItem`] | A marketplace listing the user bookmarked. `item_name` is the client-side key; `id` is the remote post id and is required for any remote relation write. |
//! | [`PendingOp`] | A remote write that failed and is waiting for the next reconciliation pass. |
//!
//! Older mirrors stored the listing title under `name`; it is accepted as an
//! alias of `item_name` when decoding.

use serde::{Deserialize, Serialize};

/// A marketplace listing bookmarked by a user.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedItem {
    /// Remote post id, `None` for items that were never stored remotely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "name")]
    pub item_name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Listing timestamp as reported by the remote store
    #[serde(default, alias = "timestamp")]
    pub created_at: Option<String>,
    /// Listing category
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_sold: bool,
}

impl SavedItem {
    /// An item carrying only a name. Handy for tests and quick saves.
    pub fn named(item_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            ..Self::default()
        }
    }

    /// Builder method to attach the remote post id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Whether `key` names this item, either by post id or by item name.
    pub fn matches_key(&self, key: &str) -> bool {
        self.item_name == key || self.id.as_deref() == Some(key)
    }

    /// Whether two items refer to the same listing.
    pub fn same_listing(&self, other: &SavedItem) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) if a == b => true,
            _ => self.item_name == other.item_name,
        }
    }
}

/// Kind of remote write waiting in the pending journal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingKind {
    Upsert,
    Delete,
}

/// A remote relation write that has not reached the remote store yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingOp {
    pub kind: PendingKind,
    pub post_id: String,
    pub user_id: String,
    /// Name of the saved item the write belongs to. Empty in journals written
    /// before the name was recorded.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub item_name: String,
    /// Milliseconds since the Unix epoch when the op was queued
    pub queued_at: i64,
}

impl PendingOp {
    pub fn new(kind: PendingKind, post_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            kind,
            post_id: post_id.into(),
            user_id: user_id.into(),
            item_name: String::new(),
            queued_at: current_timestamp_ms(),
        }
    }

    /// Builder method to record which saved item the write belongs to.
    pub fn for_item(mut self, item_name: impl Into<String>) -> Self {
        self.item_name = item_name.into();
        self
    }

    /// Whether this op targets the same relation row as `other`.
    pub fn same_relation(&self, other: &PendingOp) -> bool {
        self.post_id == other.post_id && self.user_id == other.user_id
    }
}

/// Milliseconds since the Unix epoch, platform-aware.
pub fn current_timestamp_ms() -> i64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as i64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_legacy_name_key() {
        let item: SavedItem =
            serde_json::from_str(r#"{"name":"Chair","price":12.5,"timestamp":"2024-05-01"}"#)
                .unwrap();
        assert_eq!(item.item_name, "Chair");
        assert_eq!(item.price, Some(12.5));
        assert_eq!(item.created_at.as_deref(), Some("2024-05-01"));
        assert!(!item.is_sold);
        assert!(item.id.is_none());
    }

    #[test]
    fn test_decode_remote_post_row() {
        let item: SavedItem = serde_json::from_str(
            r#"{"id":"p9","item_name":"Bike","type":"sports","image_url":"/b.png","is_sold":true,"location":"Butuan"}"#,
        )
        .unwrap();
        assert_eq!(item.id.as_deref(), Some("p9"));
        assert_eq!(item.r#type.as_deref(), Some("sports"));
        assert!(item.is_sold);
    }

    #[test]
    fn test_matching() {
        let chair = SavedItem::named("Chair").with_id("p1");
        assert!(chair.matches_key("Chair"));
        assert!(chair.matches_key("p1"));
        assert!(!chair.matches_key("Lamp"));

        // Same id wins even if the title changed upstream
        let renamed = SavedItem::named("Wooden chair").with_id("p1");
        assert!(chair.same_listing(&renamed));

        // Without ids, the name decides
        assert!(SavedItem::named("Chair").same_listing(&SavedItem::named("Chair")));
        assert!(!SavedItem::named("Chair").same_listing(&SavedItem::named("Desk")));
    }

    #[test]
    fn test_pending_op_same_relation() {
        let a = PendingOp::new(PendingKind::Upsert, "p1", "u1");
        let b = PendingOp::new(PendingKind::Delete, "p1", "u1");
        let c = PendingOp::new(PendingKind::Delete, "p2", "u1");
        assert!(a.same_relation(&b));
        assert!(!a.same_relation(&c));
        assert!(a.queued_at > 0);
    }

    #[test]
    fn test_pending_op_item_name_is_optional_on_disk() {
        let op: PendingOp = serde_json::from_str(
            r#"{"kind":"delete","post_id":"p1","user_id":"u1","queued_at":1}"#,
        )
        .unwrap();
        assert!(op.item_name.is_empty());

        let named = PendingOp::new(PendingKind::Upsert, "p1", "u1").for_item("Chair");
        let raw = serde_json::to_string(&named).unwrap();
        let back: PendingOp = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.item_name, "Chair");
    }
}
