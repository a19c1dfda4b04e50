//! Saved-products hook: the synchronizer plus a signal views can render.

use std::rc::Rc;

use dioxus::prelude::*;
use store::SavedItem;

use crate::app::{use_app, AppContext};

/// Handle to the saved-products synchronizer. Every operation refreshes the
/// item signal once it settles.
#[derive(Clone)]
pub struct SavedProductsHandle {
    app: Rc<AppContext>,
    items: Signal<Vec<SavedItem>>,
}

impl SavedProductsHandle {
    pub fn items(&self) -> Signal<Vec<SavedItem>> {
        self.items
    }

    fn refresh(&self) {
        let mut items = self.items;
        items.set(self.app.saved.items());
    }

    pub async fn load(&self, user_id: &str) {
        self.app.saved.load(user_id).await;
        self.refresh();
    }

    pub async fn add(&self, item: SavedItem, user_id: &str) {
        self.app.saved.add(item, user_id).await;
        self.refresh();
    }

    pub async fn remove(&self, key: &str, user_id: &str) {
        self.app.saved.remove(key, user_id).await;
        self.refresh();
    }

    pub async fn mark_sold(&self, post_id: &str) {
        self.app.saved.mark_sold(post_id).await;
        self.refresh();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.app.saved.contains(key)
    }
}

/// Access the saved products provided by [`AuthProvider`](crate::AuthProvider).
pub fn use_saved_products() -> SavedProductsHandle {
    SavedProductsHandle {
        app: use_app(),
        items: use_context::<Signal<Vec<SavedItem>>>(),
    }
}
