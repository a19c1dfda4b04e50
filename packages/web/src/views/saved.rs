use dioxus::prelude::*;
use store::SavedItem;
use ui::use_saved_products;

use super::use_current_user;

/// The signed-in user's saved listings.
#[component]
pub fn Saved() -> Element {
    let user = use_current_user();
    let saved = use_saved_products();
    let items = saved.items();
    let user_id = user.map(|u| u.id).unwrap_or_default();

    // Reconcile with the remote copy whenever the page opens
    let loader = saved.clone();
    let load_for = user_id.clone();
    let _ = use_resource(move || {
        let saved = loader.clone();
        let user_id = load_for.clone();
        async move {
            if !user_id.is_empty() {
                saved.load(&user_id).await;
            }
        }
    });

    rsx! {
        div {
            class: "p-8 flex flex-col gap-4",
            h1 { class: "text-xl font-bold", "Saved listings" }
            if items.read().is_empty() {
                p { class: "text-neutral-600", "Nothing saved yet." }
            }
            ul {
                class: "flex flex-col gap-3",
                for item in items.read().iter().cloned() {
                    SavedRow {
                        key: "{item.item_name}",
                        item: item,
                        user_id: user_id.clone(),
                    }
                }
            }
        }
    }
}

#[component]
fn SavedRow(item: SavedItem, user_id: String) -> Element {
    let saved = use_saved_products();
    let price = item.price.map(|p| format!("{p:.2}")).unwrap_or_default();
    let location = item.location.clone().unwrap_or_default();

    let remover = saved.clone();
    let remove_key = item.id.clone().unwrap_or_else(|| item.item_name.clone());
    let remove_user = user_id.clone();
    let on_remove = move |_| {
        let saved = remover.clone();
        let key = remove_key.clone();
        let user_id = remove_user.clone();
        async move { saved.remove(&key, &user_id).await }
    };

    let sold_id = item.id.clone();
    let on_sold = move |_| {
        let saved = saved.clone();
        let post_id = sold_id.clone();
        async move {
            if let Some(post_id) = post_id {
                saved.mark_sold(&post_id).await;
            }
        }
    };

    rsx! {
        li {
            class: "flex items-center gap-4 border rounded p-3",
            if let Some(image) = &item.image_url {
                img { class: "w-12 h-12 object-cover rounded", src: "{image}" }
            }
            div {
                class: "flex-1",
                div { class: "font-medium", "{item.item_name}" }
                div { class: "text-sm text-neutral-600", "{price} {location}" }
            }
            if item.is_sold {
                span { class: "text-xs uppercase text-red-600", "Sold" }
            } else if item.id.is_some() {
                button { class: "text-sm border rounded px-2 py-1", onclick: on_sold, "Mark sold" }
            }
            button { class: "text-sm border rounded px-2 py-1", onclick: on_remove, "Remove" }
        }
    }
}
