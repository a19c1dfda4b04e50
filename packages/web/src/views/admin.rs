use dioxus::prelude::*;
use ui::{use_app, use_saved_products};

use super::use_current_user;

/// Admin dashboard. Reachable only when the provider reports the admin flag.
#[component]
pub fn Admin() -> Element {
    let app = use_app();
    let user = use_current_user();
    let saved = use_saved_products();
    let items = saved.items();

    let name = user
        .as_ref()
        .map(|u| u.display_name().to_string())
        .unwrap_or_default();
    let role = app.users.user_role();
    let saved_count = items.read().len();
    let pending_count = app.saved.pending().len();
    let timeout_ms = app.config.sync.request_timeout_ms;

    rsx! {
        div {
            class: "p-8 flex flex-col gap-4",
            h1 { class: "text-xl font-bold", "Admin" }
            p { "Signed in as {name} ({role})" }
            dl {
                class: "grid grid-cols-2 gap-2 text-sm max-w-[360px]",
                dt { "Saved listings on this device" }
                dd { "{saved_count}" }
                dt { "Remote writes awaiting sync" }
                dd { "{pending_count}" }
                dt { "Request timeout" }
                dd { "{timeout_ms} ms" }
            }
        }
    }
}
