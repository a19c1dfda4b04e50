use api::UserData;
use dioxus::prelude::*;
use ui::{use_app, use_auth};

use crate::Route;

/// Profile of the signed-in user, refreshed from the provider on mount.
#[component]
pub fn Profile() -> Element {
    let app = use_app();
    let auth = use_auth();

    let fresh = use_resource(move || {
        let app = app.clone();
        async move { app.users.get_user_information().await }
    });

    let user: Option<UserData> = fresh.read().clone().flatten().or_else(|| auth().user);
    let Some(user) = user else {
        return rsx! { p { class: "p-8", "Loading profile..." } };
    };
    let display_name = user.display_name().to_string();
    let role = user.role_label();

    rsx! {
        div {
            class: "p-8 flex flex-col gap-4 max-w-[480px]",
            div {
                class: "flex items-center gap-4",
                img {
                    class: "w-16 h-16 rounded-full object-cover",
                    src: "{user.image_url}",
                    alt: "{display_name}",
                }
                div {
                    h1 { class: "text-xl font-bold", "{display_name}" }
                    p { class: "text-neutral-600", "{user.email}" }
                    span { class: "text-xs uppercase text-neutral-500", "{role}" }
                }
            }
            if !user.extra.is_empty() {
                dl {
                    class: "grid grid-cols-2 gap-2 text-sm",
                    for (key, value) in user.extra.iter() {
                        dt { key: "{key}", class: "text-neutral-500", "{key}" }
                        dd { "{value}" }
                    }
                }
            }
            Link { to: Route::Settings {}, "Edit profile" }
        }
    }
}
