//! Settings page: profile metadata and appearance.

use api::validators;
use dioxus::prelude::*;
use serde_json::{json, Map};
use ui::{use_app, use_auth, ThemeToggle};

#[component]
pub fn Settings() -> Element {
    let app = use_app();
    let mut auth = use_auth();
    let current = auth().user;
    let mut name = use_signal(|| current.as_ref().map(|u| u.name.clone()).unwrap_or_default());
    let mut image_url = use_signal(|| {
        current
            .as_ref()
            .map(|u| u.image_url.clone())
            .unwrap_or_default()
    });
    let mut error = use_signal(|| Option::<String>::None);
    let mut saved_notice = use_signal(|| false);
    let mut uploading = use_signal(|| false);

    let upload_app = app.clone();
    let handle_image = move |evt: FormEvent| {
        let app = upload_app.clone();
        async move {
            let Some(file) = evt.files().into_iter().next() else {
                return;
            };
            error.set(None);
            saved_notice.set(false);
            uploading.set(true);
            let content_type = file
                .content_type()
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let result = match file.read_bytes().await {
                Ok(bytes) => {
                    app.users
                        .upload_user_image(&app.storage, &file.name(), bytes.to_vec(), &content_type)
                        .await
                }
                Err(e) => {
                    tracing::error!("Failed to read {}: {e}", file.name());
                    uploading.set(false);
                    error.set(Some("Could not read the selected file".to_string()));
                    return;
                }
            };
            uploading.set(false);
            match result {
                Ok(user) => {
                    image_url.set(user.image_url.clone());
                    let mut state = auth();
                    state.user = Some(user);
                    auth.set(state);
                    saved_notice.set(true);
                }
                Err(e) => {
                    tracing::error!("Failed to upload profile image: {e}");
                    error.set(Some(e.to_string()));
                }
            }
        }
    };

    let handle_save = move |evt: FormEvent| {
        evt.prevent_default();
        let app = app.clone();
        spawn(async move {
            error.set(None);
            saved_notice.set(false);
            let n = name().trim().to_string();
            let url = image_url().trim().to_string();
            let checks = validators::required(&n)
                .and_then(|_| validators::length(&n, 2))
                .and_then(|_| validators::url(&url));
            if let Err(message) = checks {
                error.set(Some(message));
                return;
            }

            let mut attrs = Map::new();
            attrs.insert("name".to_string(), json!(n));
            if !url.is_empty() {
                attrs.insert("image_url".to_string(), json!(url));
            }
            match app.users.update_user_information(attrs).await {
                Ok(user) => {
                    let mut state = auth();
                    state.user = Some(user);
                    auth.set(state);
                    saved_notice.set(true);
                }
                Err(e) => {
                    tracing::error!("Failed to update profile: {e}");
                    error.set(Some(e.to_string()));
                }
            }
        });
    };

    rsx! {
        div {
            class: "p-8 flex flex-col gap-6 max-w-[420px]",
            h1 { class: "text-xl font-bold", "Settings" }

            form {
                onsubmit: handle_save,
                class: "flex flex-col gap-3",
                if let Some(err) = error() {
                    div { class: "text-red-600 text-sm", "{err}" }
                }
                if saved_notice() {
                    div { class: "text-green-700 text-sm", "Profile updated" }
                }
                label { class: "text-sm text-neutral-600", "Display name" }
                input {
                    class: "border rounded px-3 py-2",
                    value: name(),
                    oninput: move |evt: FormEvent| name.set(evt.value()),
                }
                label { class: "text-sm text-neutral-600", "Avatar URL" }
                input {
                    class: "border rounded px-3 py-2",
                    value: image_url(),
                    oninput: move |evt: FormEvent| image_url.set(evt.value()),
                }
                label { class: "text-sm text-neutral-600", "Or upload a picture" }
                input {
                    r#type: "file",
                    accept: "image/*",
                    disabled: uploading(),
                    onchange: handle_image,
                }
                button { class: "rounded bg-neutral-800 text-white py-2", r#type: "submit", "Save" }
            }

            section {
                class: "flex items-center justify-between",
                span { "Appearance" }
                ThemeToggle { class: "border rounded px-3 py-1" }
            }
        }
    }
}
