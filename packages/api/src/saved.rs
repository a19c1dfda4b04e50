//! # Saved products
//!
//! Local-first synchronizer for one user's saved-item set across three tiers:
//!
//! | Tier | Role |
//! |------|------|
//! | memory | authoritative for rendering |
//! | [`LocalMirror`] | survives restarts when the remote is unavailable |
//! | [`RemoteStore`] | authoritative across devices (`saved_posts` join table) |
//!
//! ## Write path
//!
//! [`add`](SavedProducts::add), [`remove`](SavedProducts::remove) and
//! [`mark_sold`](SavedProducts::mark_sold) change memory first and write the
//! whole set through to the mirror before any network call. Every relation
//! write is recorded in the pending journal (stored alongside the items in the
//! mirror blob) before it is sent and cleared once the remote accepts it. A
//! failed write is logged and stays journaled; it is never returned to the
//! caller and never rolled back locally.
//!
//! An item saved by name whose listing cannot be looked up yet keeps no post
//! id and stays on this device; every `load` tries the lookup again.
//!
//! ## Reconciliation
//!
//! [`load`](SavedProducts::load) replays the pending journal once, fetches the
//! remote set, and re-applies whatever intent is still pending on top of it.
//! Relations whose listing no longer exists upstream are dropped. If the set
//! changed locally while the fetch was in flight, the local set is kept and
//! the next `load` reconciles it.
//!
//! The mirror records which user the set belongs to. Loading for a different
//! user starts from an empty set and never falls back to another user's copy.
//!
//! ## Concurrency
//!
//! Remote writes for the same item are serialised through a per-item async
//! lock keyed by item name and acquired in call order, so an `add` racing a
//! `remove` or a journal replay reaches the remote in the order the user
//! issued them.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::{json, Value};
use store::{KeyValueStore, LocalMirror, PendingKind, PendingOp, SavedItem};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

use crate::auth::IdentityProvider;
use crate::error::RemoteError;
use crate::remote::{Query, RemoteStore};
use crate::timeout::with_timeout;

/// User ↔ post relation table.
pub const SAVED_TABLE: &str = "saved_posts";
/// Listing table.
pub const POSTS_TABLE: &str = "posts";

const RELATION_CONFLICT: &str = "user_id,post_id";

#[derive(Debug, Default)]
struct SavedState {
    owner: Option<String>,
    items: Vec<SavedItem>,
    pending: Vec<PendingOp>,
    /// Bumped on every change to the set or the journal.
    revision: u64,
}

/// Async locks keyed by item.
#[derive(Debug, Default)]
struct KeyLocks(Mutex<HashMap<String, Arc<AsyncMutex<()>>>>);

impl KeyLocks {
    async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.0.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(key.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Text form of a remote id column, which may be numeric.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Build a saved item from a `posts` row.
fn item_from_post(mut row: Value, relation_sold: bool) -> Result<SavedItem, serde_json::Error> {
    if let Some(id) = row.get("id").and_then(id_text) {
        row["id"] = Value::String(id);
    }
    let mut item: SavedItem = serde_json::from_value(row)?;
    item.is_sold |= relation_sold;
    Ok(item)
}

/// Synchronizer for one user's saved products.
pub struct SavedProducts<I, R, S: KeyValueStore> {
    identity: I,
    remote: R,
    mirror: LocalMirror<S>,
    timeout: Duration,
    state: Mutex<SavedState>,
    locks: KeyLocks,
}

impl<I, R, S> SavedProducts<I, R, S>
where
    I: IdentityProvider,
    R: RemoteStore,
    S: KeyValueStore,
{
    /// Create the synchronizer, restoring items and pending writes from the
    /// mirror.
    pub fn new(identity: I, remote: R, mirror: LocalMirror<S>, timeout: Duration) -> Self {
        let snapshot = mirror.load().unwrap_or_default();
        debug!(
            items = snapshot.items.len(),
            pending = snapshot.pending.len(),
            "Restored saved products from {}",
            mirror.key()
        );
        Self {
            identity,
            remote,
            mirror,
            timeout,
            state: Mutex::new(SavedState {
                owner: snapshot.owner,
                items: snapshot.items,
                pending: snapshot.pending,
                revision: 0,
            }),
            locks: KeyLocks::default(),
        }
    }

    /// Current saved set.
    pub fn items(&self) -> Vec<SavedItem> {
        self.state().items.clone()
    }

    /// Relation writes the remote has not confirmed yet.
    pub fn pending(&self) -> Vec<PendingOp> {
        self.state().pending.clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state().items.iter().any(|item| item.matches_key(key))
    }

    fn state(&self) -> MutexGuard<'_, SavedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write the whole set through to the mirror.
    fn persist(&self, state: &SavedState) {
        if let Err(e) = self
            .mirror
            .save(state.owner.as_deref(), &state.items, &state.pending)
        {
            error!("Failed to write saved products to {}: {e}", self.mirror.key());
        }
    }

    /// Record a change to the set or the journal.
    fn commit(&self, state: &mut SavedState) {
        state.revision += 1;
        self.persist(state);
    }

    /// Make `user_id` the owner of the set, dropping another user's items.
    /// Journaled writes are kept; they carry their own user id.
    fn claim(&self, state: &mut SavedState, user_id: &str) {
        if state.owner.as_deref() == Some(user_id) {
            return;
        }
        if let Some(previous) = state.owner.as_deref() {
            info!(previous, user_id, "Saved products belong to another user, starting empty");
            state.items.clear();
        }
        state.owner = Some(user_id.to_string());
        self.commit(state);
    }

    async fn bounded<T>(
        &self,
        request: impl Future<Output = Result<T, RemoteError>>,
    ) -> Result<T, RemoteError> {
        with_timeout(self.timeout, request).await?
    }

    /// Lock key for a post: the saved item's name when it is in the set.
    fn key_for_post(&self, post_id: &str) -> String {
        self.state()
            .items
            .iter()
            .find(|item| item.id.as_deref() == Some(post_id))
            .map(|item| item.item_name.clone())
            .unwrap_or_else(|| post_id.to_string())
    }

    /// Lock key for a journaled write. Journals written before item names were
    /// recorded fall back to the post lookup.
    fn key_for_op(&self, op: &PendingOp) -> String {
        if op.item_name.is_empty() {
            self.key_for_post(&op.post_id)
        } else {
            op.item_name.clone()
        }
    }

    fn relation_query(post_id: &str, user_id: &str) -> Query {
        Query::table(SAVED_TABLE)
            .eq("post_id", post_id)
            .eq("user_id", user_id)
    }

    async fn push_relation(&self, op: &PendingOp) -> Result<(), RemoteError> {
        match op.kind {
            PendingKind::Upsert => {
                let row = json!({ "user_id": op.user_id, "post_id": op.post_id });
                self.bounded(self.remote.upsert(SAVED_TABLE, row, RELATION_CONFLICT))
                    .await
            }
            PendingKind::Delete => {
                let query = Self::relation_query(&op.post_id, &op.user_id);
                self.bounded(self.remote.delete(&query)).await
            }
        }
    }

    /// Journal one relation write, then send it. The caller holds the item's
    /// lock.
    async fn write_relation(&self, op: PendingOp) {
        {
            let mut state = self.state();
            state.pending.retain(|p| !p.same_relation(&op));
            state.pending.push(op.clone());
            self.commit(&mut state);
        }
        match self.push_relation(&op).await {
            Ok(()) => self.settle(&op),
            Err(e) => error!(
                post_id = %op.post_id,
                "Remote {:?} of saved product failed, kept for the next load: {e}",
                op.kind
            ),
        }
    }

    /// Forget journaled intent superseded by a successful write.
    fn settle(&self, op: &PendingOp) {
        let mut state = self.state();
        let before = state.pending.len();
        state.pending.retain(|p| !p.same_relation(op));
        if state.pending.len() != before {
            self.commit(&mut state);
        }
    }

    /// Post id of the listing called `name`, `None` when there is no such
    /// listing.
    async fn resolve_post_id(&self, name: &str) -> Result<Option<String>, RemoteError> {
        let query = Query::table(POSTS_TABLE)
            .select("id")
            .eq("item_name", name);
        let row = self.bounded(self.remote.select_single(&query)).await?;
        Ok(row.and_then(|row| row.get("id").and_then(id_text)))
    }

    /// Write the relation for the saved item called `name`, looking its post
    /// id up first when it has none. The caller holds the item's lock.
    async fn push_saved(&self, name: &str, user_id: &str) {
        let known = self
            .state()
            .items
            .iter()
            .find(|i| i.item_name == name)
            .map(|i| i.id.clone());
        let post_id = match known {
            // Removed while we waited for the lock
            None => return,
            Some(Some(id)) => id,
            Some(None) => match self.resolve_post_id(name).await {
                Ok(Some(id)) => {
                    let mut state = self.state();
                    let Some(saved) = state
                        .items
                        .iter_mut()
                        .find(|i| i.id.is_none() && i.item_name == name)
                    else {
                        return;
                    };
                    saved.id = Some(id.clone());
                    self.commit(&mut state);
                    id
                }
                Ok(None) => {
                    warn!(item = name, "No listing found, kept on this device only");
                    return;
                }
                Err(e) => {
                    error!(item = name, "Failed to look up listing, retrying on the next load: {e}");
                    return;
                }
            },
        };
        self.write_relation(PendingOp::new(PendingKind::Upsert, post_id, user_id).for_item(name))
            .await;
    }

    /// Replay the pending journal for `user_id` once, then retry listing
    /// lookups for items saved by name only.
    async fn replay_pending(&self, user_id: &str) {
        let ops: Vec<PendingOp> = self
            .state()
            .pending
            .iter()
            .filter(|op| op.user_id == user_id)
            .cloned()
            .collect();
        for op in ops {
            let _guard = self.locks.acquire(&self.key_for_op(&op)).await;
            // A newer write may have settled this relation while we waited.
            if !self.state().pending.contains(&op) {
                continue;
            }
            match self.push_relation(&op).await {
                Ok(()) => {
                    debug!(post_id = %op.post_id, "Replayed pending {:?}", op.kind);
                    self.settle(&op);
                }
                Err(e) => warn!(post_id = %op.post_id, "Pending {:?} still failing: {e}", op.kind),
            }
        }

        let unmatched: Vec<String> = self
            .state()
            .items
            .iter()
            .filter(|i| i.id.is_none())
            .map(|i| i.item_name.clone())
            .collect();
        for name in unmatched {
            let _guard = self.locks.acquire(&name).await;
            let still_unmatched = self
                .state()
                .items
                .iter()
                .any(|i| i.id.is_none() && i.item_name == name);
            if still_unmatched {
                self.push_saved(&name, user_id).await;
            }
        }
    }

    async fn fetch_remote(&self, user_id: &str) -> Result<Vec<SavedItem>, RemoteError> {
        let relations = self
            .bounded(
                self.remote.select(
                    &Query::table(SAVED_TABLE)
                        .select("post_id,is_sold")
                        .eq("user_id", user_id),
                ),
            )
            .await?;
        let relations: Vec<(String, bool)> = relations
            .iter()
            .filter_map(|row| {
                let post_id = row.get("post_id").and_then(id_text)?;
                let sold = row.get("is_sold").and_then(Value::as_bool).unwrap_or(false);
                Some((post_id, sold))
            })
            .collect();
        if relations.is_empty() {
            return Ok(Vec::new());
        }

        let posts = self
            .bounded(self.remote.select(
                &Query::table(POSTS_TABLE).is_in("id", relations.iter().map(|(id, _)| id.as_str())),
            ))
            .await?;
        let mut posts: HashMap<String, Value> = posts
            .into_iter()
            .filter_map(|row| Some((row.get("id").and_then(id_text)?, row)))
            .collect();

        let mut items: Vec<SavedItem> = Vec::with_capacity(relations.len());
        for (post_id, sold) in relations {
            let Some(row) = posts.remove(&post_id) else {
                info!(post_id = %post_id, "Saved listing no longer exists, dropping it");
                continue;
            };
            match item_from_post(row, sold) {
                Ok(item) if !items.iter().any(|i| i.same_listing(&item)) => items.push(item),
                Ok(_) => {}
                Err(e) => warn!(post_id = %post_id, "Skipping unreadable listing: {e}"),
            }
        }
        Ok(items)
    }

    /// Replace the saved set with the remote copy for `user_id`.
    ///
    /// Falls back to the mirror (or an empty set) when the remote cannot be
    /// read.
    pub async fn load(&self, user_id: &str) {
        {
            let mut state = self.state();
            self.claim(&mut state, user_id);
        }
        self.replay_pending(user_id).await;
        let revision = self.state().revision;

        match self.fetch_remote(user_id).await {
            Ok(mut fetched) => {
                let mut state = self.state();
                if state.revision != revision {
                    debug!("Saved products changed while loading, keeping the local set");
                    return;
                }
                for op in state.pending.iter().filter(|op| op.user_id == user_id) {
                    match op.kind {
                        PendingKind::Upsert => {
                            let present =
                                fetched.iter().any(|i| i.id.as_deref() == Some(op.post_id.as_str()));
                            let local = state
                                .items
                                .iter()
                                .find(|i| i.id.as_deref() == Some(op.post_id.as_str()));
                            if let (false, Some(local)) = (present, local) {
                                fetched.push(local.clone());
                            }
                        }
                        PendingKind::Delete => {
                            fetched.retain(|i| i.id.as_deref() != Some(op.post_id.as_str()));
                        }
                    }
                }
                for local in state.items.iter().filter(|i| i.id.is_none()) {
                    if !fetched.iter().any(|i| i.same_listing(local)) {
                        fetched.push(local.clone());
                    }
                }
                debug!(items = fetched.len(), "Loaded saved products for {user_id}");
                state.items = fetched;
                self.commit(&mut state);
            }
            Err(e) => {
                warn!("Failed to load saved products, using local copy: {e}");
                let items = self
                    .mirror
                    .load()
                    .filter(|snapshot| snapshot.belongs_to(user_id))
                    .map(|snapshot| snapshot.items)
                    .unwrap_or_default();
                self.state().items = items;
            }
        }
    }

    /// Save `item` for `user_id`. Saving an item already in the set is a no-op.
    pub async fn add(&self, item: SavedItem, user_id: &str) {
        {
            let mut state = self.state();
            self.claim(&mut state, user_id);
            if state.items.iter().any(|i| i.same_listing(&item)) {
                debug!(item = %item.item_name, "Already saved");
                return;
            }
            state.items.push(item.clone());
            self.commit(&mut state);
        }

        let _guard = self.locks.acquire(&item.item_name).await;
        self.push_saved(&item.item_name, user_id).await;
    }

    /// Unsave the item whose name or id is `key`.
    pub async fn remove(&self, key: &str, user_id: &str) {
        let removed = {
            let mut state = self.state();
            self.claim(&mut state, user_id);
            let Some(index) = state.items.iter().position(|i| i.matches_key(key)) else {
                debug!(item = key, "Not saved, nothing to remove");
                return;
            };
            let removed = state.items.remove(index);
            self.commit(&mut state);
            removed
        };

        let _guard = self.locks.acquire(&removed.item_name).await;
        let post_id = match removed.id {
            Some(id) => id,
            None => match self.resolve_post_id(&removed.item_name).await {
                Ok(Some(id)) => id,
                Ok(None) => return,
                Err(e) => {
                    error!(item = %removed.item_name, "Failed to look up listing to unsave: {e}");
                    return;
                }
            },
        };
        self.write_relation(
            PendingOp::new(PendingKind::Delete, post_id, user_id).for_item(&removed.item_name),
        )
        .await;
    }

    /// Mark the saved listing `post_id` as sold for the signed-in user, then
    /// reload from the remote.
    pub async fn mark_sold(&self, post_id: &str) {
        let user = match with_timeout(self.timeout, self.identity.get_session()).await {
            Ok(Ok(Some(session))) => session.user,
            Ok(Ok(None)) => {
                info!(post_id, "Not signed in, cannot mark as sold");
                return;
            }
            Ok(Err(e)) => {
                info!(post_id, "Session unavailable, cannot mark as sold: {e}");
                return;
            }
            Err(e) => {
                info!(post_id, "Session query timed out after {:?}, cannot mark as sold", e.0);
                return;
            }
        };

        {
            let _guard = self.locks.acquire(&self.key_for_post(post_id)).await;
            let query = Self::relation_query(post_id, &user.id);
            match self
                .bounded(self.remote.update(&query, json!({ "is_sold": true })))
                .await
            {
                Ok(rows) if rows.is_empty() => {
                    warn!(post_id, "No saved relation to mark as sold");
                    return;
                }
                Ok(_) => {
                    let mut state = self.state();
                    for item in state
                        .items
                        .iter_mut()
                        .filter(|i| i.id.as_deref() == Some(post_id))
                    {
                        item.is_sold = true;
                    }
                    self.commit(&mut state);
                }
                Err(e) => {
                    error!(post_id, "Failed to mark saved product as sold: {e}");
                    return;
                }
            }
        }

        self.load(&user.id).await;
    }

    /// Drop the saved set and its mirror (sign-out).
    pub fn reset(&self) {
        let mut state = self.state();
        *state = SavedState {
            revision: state.revision + 1,
            ..SavedState::default()
        };
        if let Err(e) = self.mirror.clear() {
            error!("Failed to clear {}: {e}", self.mirror.key());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryIdentity;
    use crate::models::AuthUser;
    use crate::remote::MemoryRemote;
    use store::MemoryStore;

    const MIRROR_KEY: &str = "savedProducts";

    struct Fixture {
        identity: MemoryIdentity,
        remote: MemoryRemote,
        store: MemoryStore,
        saved: SavedProducts<MemoryIdentity, MemoryRemote, MemoryStore>,
    }

    fn fixture() -> Fixture {
        fixture_with(MemoryStore::new(), Duration::from_millis(200))
    }

    fn fixture_with(store: MemoryStore, timeout: Duration) -> Fixture {
        let identity = MemoryIdentity::new();
        let remote = MemoryRemote::new();
        let saved = SavedProducts::new(
            identity.clone(),
            remote.clone(),
            LocalMirror::new(store.clone(), MIRROR_KEY),
            timeout,
        );
        Fixture {
            identity,
            remote,
            store,
            saved,
        }
    }

    fn mirrored(store: &MemoryStore) -> Vec<SavedItem> {
        LocalMirror::new(store.clone(), MIRROR_KEY)
            .load()
            .map(|s| s.items)
            .unwrap_or_default()
    }

    fn post(remote: &MemoryRemote, id: &str, name: &str) {
        remote.insert_row(
            POSTS_TABLE,
            json!({ "id": id, "item_name": name, "price": 10.0, "is_sold": false }),
        );
    }

    fn names(items: &[SavedItem]) -> Vec<&str> {
        items.iter().map(|i| i.item_name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_add_writes_through_to_mirror() {
        let f = fixture();
        f.saved.add(SavedItem::named("Chair"), "u1").await;

        assert_eq!(names(&f.saved.items()), ["Chair"]);
        assert_eq!(mirrored(&f.store), f.saved.items());
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let f = fixture();
        post(&f.remote, "p1", "Chair");
        f.saved.add(SavedItem::named("Chair").with_id("p1"), "u1").await;
        let calls = f.remote.calls();

        f.saved.add(SavedItem::named("Chair"), "u1").await;
        f.saved.add(SavedItem::named("Chair").with_id("p1"), "u1").await;

        assert_eq!(f.saved.items().len(), 1);
        assert_eq!(f.remote.calls(), calls);
        assert_eq!(f.remote.rows(SAVED_TABLE).len(), 1);
    }

    #[tokio::test]
    async fn test_add_resolves_post_id_by_name() {
        let f = fixture();
        post(&f.remote, "p7", "Lamp");
        f.saved.add(SavedItem::named("Lamp"), "u1").await;

        assert_eq!(f.saved.items()[0].id.as_deref(), Some("p7"));
        assert_eq!(mirrored(&f.store)[0].id.as_deref(), Some("p7"));
        let rows = f.remote.rows(SAVED_TABLE);
        assert_eq!(rows, vec![json!({ "user_id": "u1", "post_id": "p7" })]);
    }

    #[tokio::test]
    async fn test_remote_write_failure_keeps_local_state() {
        let f = fixture();
        f.remote.set_fail_writes(true);
        f.saved.add(SavedItem::named("Chair").with_id("p1"), "u1").await;

        assert_eq!(names(&f.saved.items()), ["Chair"]);
        assert_eq!(names(&mirrored(&f.store)), ["Chair"]);
        assert!(f.remote.rows(SAVED_TABLE).is_empty());

        let pending = f.saved.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].kind, PendingKind::Upsert);
        assert_eq!(pending[0].post_id, "p1");
    }

    #[tokio::test]
    async fn test_add_then_load_round_trip() {
        let f = fixture();
        post(&f.remote, "p1", "Chair");
        post(&f.remote, "p2", "Desk");

        f.saved.add(SavedItem::named("Chair").with_id("p1"), "u1").await;
        f.saved.load("u1").await;
        assert_eq!(names(&f.saved.items()), ["Chair"]);
        assert_eq!(f.saved.items()[0].price, Some(10.0));

        f.saved.remove("Chair", "u1").await;
        f.saved.load("u1").await;
        assert!(f.saved.items().is_empty());
        assert!(f.remote.rows(SAVED_TABLE).is_empty());
    }

    #[tokio::test]
    async fn test_remove_by_id() {
        let f = fixture();
        post(&f.remote, "p1", "Chair");
        f.saved.add(SavedItem::named("Chair").with_id("p1"), "u1").await;
        f.saved.remove("p1", "u1").await;

        assert!(f.saved.items().is_empty());
        assert!(mirrored(&f.store).is_empty());
        assert!(f.remote.rows(SAVED_TABLE).is_empty());
    }

    #[tokio::test]
    async fn test_load_falls_back_to_mirror() {
        let store = MemoryStore::new();
        LocalMirror::new(store.clone(), MIRROR_KEY)
            .save(None, &[SavedItem::named("Chair")], &[])
            .unwrap();

        let f = fixture_with(store, Duration::from_millis(200));
        f.remote.set_fail_reads(true);
        f.saved.load("u1").await;
        assert_eq!(names(&f.saved.items()), ["Chair"]);
    }

    #[tokio::test]
    async fn test_load_without_remote_or_mirror_is_empty() {
        let f = fixture();
        f.saved.add(SavedItem::named("Chair"), "u1").await;
        f.store.remove(MIRROR_KEY).unwrap();
        f.remote.set_fail_reads(true);

        f.saved.load("u1").await;
        assert!(f.saved.items().is_empty());
    }

    #[tokio::test]
    async fn test_load_drops_listings_deleted_upstream() {
        let f = fixture();
        post(&f.remote, "1", "Chair");
        f.remote.insert_row(SAVED_TABLE, json!({ "user_id": "u1", "post_id": 1 }));
        f.remote.insert_row(SAVED_TABLE, json!({ "user_id": "u1", "post_id": 2 }));
        f.remote.insert_row(SAVED_TABLE, json!({ "user_id": "u2", "post_id": 1 }));

        f.saved.load("u1").await;
        let items = f.saved.items();
        assert_eq!(names(&items), ["Chair"]);
        assert_eq!(items[0].id.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_load_replays_pending_writes() {
        let f = fixture();
        post(&f.remote, "p1", "Chair");
        f.remote.set_fail_writes(true);
        f.saved.add(SavedItem::named("Chair").with_id("p1"), "u1").await;
        assert_eq!(f.saved.pending().len(), 1);

        f.remote.set_fail_writes(false);
        f.saved.load("u1").await;
        assert!(f.saved.pending().is_empty());
        assert_eq!(f.remote.rows(SAVED_TABLE).len(), 1);
        assert_eq!(names(&f.saved.items()), ["Chair"]);
    }

    #[tokio::test]
    async fn test_load_keeps_still_pending_intent() {
        let f = fixture();
        post(&f.remote, "p1", "Chair");
        post(&f.remote, "p2", "Desk");
        f.remote.insert_row(SAVED_TABLE, json!({ "user_id": "u1", "post_id": "p2" }));
        f.saved.load("u1").await;

        f.remote.set_fail_writes(true);
        f.saved.add(SavedItem::named("Chair").with_id("p1"), "u1").await;
        f.saved.remove("Desk", "u1").await;
        f.saved.load("u1").await;

        assert_eq!(names(&f.saved.items()), ["Chair"]);
        assert_eq!(f.saved.pending().len(), 2);
    }

    #[tokio::test]
    async fn test_new_restores_mirror_and_journal() {
        let store = MemoryStore::new();
        {
            let f = fixture_with(store.clone(), Duration::from_millis(200));
            f.remote.set_fail_writes(true);
            f.saved.add(SavedItem::named("Chair").with_id("p1"), "u1").await;
        }
        let f = fixture_with(store, Duration::from_millis(200));
        assert_eq!(names(&f.saved.items()), ["Chair"]);
        assert_eq!(f.saved.pending().len(), 1);
    }

    #[tokio::test]
    async fn test_mark_sold_requires_session() {
        let f = fixture();
        f.saved.add(SavedItem::named("Chair").with_id("post-42"), "u1").await;
        let before = f.saved.items();
        let calls = f.remote.calls();

        f.saved.mark_sold("post-42").await;
        assert_eq!(f.saved.items(), before);
        assert_eq!(f.remote.calls(), calls);
    }

    #[tokio::test]
    async fn test_mark_sold_updates_and_reloads() {
        let f = fixture();
        f.identity.sign_in(AuthUser {
            id: "u1".to_string(),
            ..AuthUser::default()
        });
        post(&f.remote, "p1", "Chair");
        f.remote.insert_row(SAVED_TABLE, json!({ "user_id": "u1", "post_id": "p1", "is_sold": false }));
        f.saved.load("u1").await;

        f.saved.mark_sold("p1").await;
        assert!(f.saved.items()[0].is_sold);
        assert!(mirrored(&f.store)[0].is_sold);
        assert_eq!(f.remote.rows(SAVED_TABLE)[0]["is_sold"], json!(true));
    }

    #[tokio::test]
    async fn test_mark_sold_without_relation_changes_nothing() {
        let f = fixture();
        f.identity.sign_in(AuthUser {
            id: "u1".to_string(),
            ..AuthUser::default()
        });
        f.saved.add(SavedItem::named("Chair").with_id("p1"), "u1").await;
        f.remote.delete(&Query::table(SAVED_TABLE)).await.unwrap();

        f.saved.mark_sold("p1").await;
        assert!(!f.saved.items()[0].is_sold);
    }

    #[tokio::test]
    async fn test_remote_timeout_is_a_failure() {
        let f = fixture_with(MemoryStore::new(), Duration::from_millis(20));
        f.remote.set_delay(Some(Duration::from_millis(500)));
        f.saved.add(SavedItem::named("Chair").with_id("p1"), "u1").await;

        assert_eq!(names(&f.saved.items()), ["Chair"]);
        assert_eq!(f.saved.pending().len(), 1);
    }

    #[tokio::test]
    async fn test_same_item_writes_reach_remote_in_order() {
        let f = fixture();
        post(&f.remote, "p1", "Chair");
        f.remote.set_delay(Some(Duration::from_millis(10)));

        futures::join!(
            f.saved.add(SavedItem::named("Chair").with_id("p1"), "u1"),
            f.saved.remove("Chair", "u1"),
        );
        assert!(f.saved.items().is_empty());
        assert!(f.remote.rows(SAVED_TABLE).is_empty());
    }

    #[tokio::test]
    async fn test_replayed_delete_and_new_add_of_same_item_are_ordered() {
        let f = fixture();
        post(&f.remote, "p1", "Chair");
        f.saved.add(SavedItem::named("Chair").with_id("p1"), "u1").await;
        f.remote.set_fail_writes(true);
        f.saved.remove("Chair", "u1").await;
        assert_eq!(f.saved.pending()[0].kind, PendingKind::Delete);
        assert_eq!(f.saved.pending()[0].item_name, "Chair");

        f.remote.set_fail_writes(false);
        f.remote.set_delay(Some(Duration::from_millis(50)));
        futures::join!(
            f.saved.load("u1"),
            f.saved.add(SavedItem::named("Chair").with_id("p1"), "u1"),
        );

        assert_eq!(names(&f.saved.items()), ["Chair"]);
        assert_eq!(names(&mirrored(&f.store)), ["Chair"]);
        assert_eq!(f.remote.rows(SAVED_TABLE).len(), 1);
        assert!(f.saved.pending().is_empty());
    }

    #[tokio::test]
    async fn test_failed_lookup_is_retried_on_load() {
        let f = fixture();
        f.remote.set_fail_reads(true);
        f.saved.add(SavedItem::named("Lamp"), "u1").await;
        assert_eq!(names(&f.saved.items()), ["Lamp"]);
        assert!(f.saved.items()[0].id.is_none());

        f.remote.set_fail_reads(false);
        post(&f.remote, "p7", "Lamp");
        f.saved.load("u1").await;

        let items = f.saved.items();
        assert_eq!(names(&items), ["Lamp"]);
        assert_eq!(items[0].id.as_deref(), Some("p7"));
        assert_eq!(
            f.remote.rows(SAVED_TABLE),
            vec![json!({ "user_id": "u1", "post_id": "p7" })]
        );
        assert!(f.saved.pending().is_empty());
    }

    #[tokio::test]
    async fn test_unlisted_item_survives_load() {
        let f = fixture();
        post(&f.remote, "p1", "Chair");
        f.remote.insert_row(SAVED_TABLE, json!({ "user_id": "u1", "post_id": "p1" }));
        f.saved.add(SavedItem::named("Lamp"), "u1").await;

        f.saved.load("u1").await;
        let items = f.saved.items();
        assert_eq!(names(&items), ["Chair", "Lamp"]);
        assert!(items[1].id.is_none());
        assert_eq!(names(&mirrored(&f.store)), ["Chair", "Lamp"]);
    }

    #[tokio::test]
    async fn test_load_for_another_user_never_shows_previous_set() {
        let f = fixture();
        f.saved.add(SavedItem::named("Chair").with_id("p1"), "u1").await;
        f.remote.set_fail_reads(true);

        f.saved.load("u2").await;
        assert!(f.saved.items().is_empty());

        let snapshot = LocalMirror::new(f.store.clone(), MIRROR_KEY).load().unwrap();
        assert_eq!(snapshot.owner.as_deref(), Some("u2"));
        assert!(snapshot.items.is_empty());
    }

    #[tokio::test]
    async fn test_restored_mirror_of_another_user_is_ignored() {
        let store = MemoryStore::new();
        LocalMirror::new(store.clone(), MIRROR_KEY)
            .save(Some("u1"), &[SavedItem::named("Chair")], &[])
            .unwrap();

        let f = fixture_with(store, Duration::from_millis(200));
        f.remote.set_fail_reads(true);
        f.saved.load("u2").await;
        assert!(f.saved.items().is_empty());
    }

    #[tokio::test]
    async fn test_mark_sold_matches_post_id_only() {
        let f = fixture();
        f.identity.sign_in(AuthUser {
            id: "u1".to_string(),
            ..AuthUser::default()
        });
        post(&f.remote, "p1", "Chair");
        f.remote.insert_row(SAVED_TABLE, json!({ "user_id": "u1", "post_id": "p1", "is_sold": false }));
        f.saved.load("u1").await;
        // An unlisted item whose name happens to equal the post id
        f.saved.add(SavedItem::named("p1"), "u1").await;

        f.saved.mark_sold("p1").await;
        let items = f.saved.items();
        let chair = items.iter().find(|i| i.item_name == "Chair").unwrap();
        let other = items.iter().find(|i| i.item_name == "p1").unwrap();
        assert!(chair.is_sold);
        assert!(!other.is_sold);
    }

    #[tokio::test]
    async fn test_reset_clears_memory_and_mirror() {
        let f = fixture();
        f.saved.add(SavedItem::named("Chair"), "u1").await;
        f.saved.reset();

        assert!(f.saved.items().is_empty());
        assert!(f.store.get(MIRROR_KEY).is_none());
    }
}
