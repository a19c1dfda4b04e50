//! Home page: save a listing by name (and post id when known).

use api::validators;
use dioxus::prelude::*;
use store::SavedItem;
use ui::use_saved_products;

use super::use_current_user;
use crate::Route;

#[component]
pub fn Home() -> Element {
    let user = use_current_user();
    let saved = use_saved_products();
    let items = saved.items();
    let mut item_name = use_signal(String::new);
    let mut post_id = use_signal(String::new);
    let mut price = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);

    let Some(user) = user else {
        return rsx! {
            div {
                class: "p-8",
                h1 { class: "text-2xl font-bold", "Welcome" }
                p { "Sign in to save listings you like." }
                Link { to: Route::Login {}, "Sign in" }
            }
        };
    };

    let display_name = user.display_name().to_string();
    let count = items.read().len();
    let user_id = user.id.clone();
    let handle_save = move |evt: FormEvent| {
        evt.prevent_default();
        let saved = saved.clone();
        let user_id = user_id.clone();
        spawn(async move {
            error.set(None);
            let name = item_name().trim().to_string();
            let price_text = price().trim().to_string();
            if let Err(message) = validators::required(&name) {
                error.set(Some(message));
                return;
            }
            if !price_text.is_empty() {
                if let Err(message) = validators::between(&price_text, 0.0, 1_000_000.0) {
                    error.set(Some(message));
                    return;
                }
            }

            let mut item = SavedItem::named(name);
            item.price = price_text.parse().ok();
            let id = post_id().trim().to_string();
            if !id.is_empty() {
                item = item.with_id(id);
            }
            saved.add(item, &user_id).await;
            item_name.set(String::new());
            post_id.set(String::new());
            price.set(String::new());
        });
    };

    rsx! {
        div {
            class: "p-8 flex flex-col gap-6",
            h1 { class: "text-2xl font-bold", "Hello, {display_name}" }
            p {
                "You have {count} saved listings. "
                Link { to: Route::Saved {}, "View them" }
            }

            form {
                onsubmit: handle_save,
                class: "flex flex-col gap-3 max-w-[360px]",
                h2 { class: "font-semibold", "Save a listing" }
                if let Some(err) = error() {
                    div { class: "text-red-600 text-sm", "{err}" }
                }
                input {
                    class: "border rounded px-3 py-2",
                    placeholder: "Item name",
                    value: item_name(),
                    oninput: move |evt: FormEvent| item_name.set(evt.value()),
                }
                input {
                    class: "border rounded px-3 py-2",
                    placeholder: "Post id (optional)",
                    value: post_id(),
                    oninput: move |evt: FormEvent| post_id.set(evt.value()),
                }
                input {
                    class: "border rounded px-3 py-2",
                    placeholder: "Price (optional)",
                    value: price(),
                    oninput: move |evt: FormEvent| price.set(evt.value()),
                }
                button { class: "rounded bg-neutral-800 text-white py-2", r#type: "submit", "Save" }
            }
        }
    }
}
