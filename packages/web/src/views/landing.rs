//! Landing page for visitors.

use dioxus::prelude::*;

use crate::Route;

#[component]
pub fn Landing() -> Element {
    rsx! {
        div {
            class: "flex flex-col items-center justify-center min-h-[70vh] gap-4 p-8",
            h1 { class: "text-3xl font-bold text-neutral-800", "Marketplace" }
            p { class: "text-neutral-600", "Buy, sell and keep an eye on listings near you." }
            div {
                class: "flex gap-3",
                Link { class: "px-4 py-2 rounded bg-neutral-800 text-white", to: Route::Login {}, "Sign in" }
                Link { class: "px-4 py-2 rounded border", to: Route::Register {}, "Create account" }
            }
        }
    }
}
