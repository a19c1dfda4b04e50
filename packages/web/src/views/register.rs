//! Registration page view with email/password form.

use api::validators;
use dioxus::prelude::*;
use serde_json::{json, Map};
use ui::{restore_session, use_app, use_auth, use_saved_products};

use crate::Route;

/// Register page component.
#[component]
pub fn Register() -> Element {
    let app = use_app();
    let auth = use_auth();
    let saved = use_saved_products().items();
    let nav = use_navigator();
    let mut name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut confirm_password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut notice = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    let handle_register = move |evt: FormEvent| {
        evt.prevent_default();
        let app = app.clone();
        spawn(async move {
            error.set(None);
            notice.set(None);

            let n = name().trim().to_string();
            let e = email().trim().to_string();
            let p = password();
            let cp = confirm_password();

            let checks = validators::required(&n)
                .and_then(|_| validators::required(&e))
                .and_then(|_| validators::email(&e))
                .and_then(|_| validators::password(&p))
                .and_then(|_| validators::confirm_password(&cp, &p));
            if let Err(message) = checks {
                error.set(Some(message));
                return;
            }

            let mut metadata = Map::new();
            metadata.insert("name".to_string(), json!(n));

            loading.set(true);
            match app.identity.sign_up(&e, &p, metadata).await {
                Ok(Some(_)) => {
                    restore_session(&app, auth, saved).await;
                    loading.set(false);
                    nav.replace(Route::Home {});
                }
                Ok(None) => {
                    loading.set(false);
                    notice.set(Some(format!("Check {e} for a confirmation link.")));
                }
                Err(err) => {
                    tracing::warn!("Registration failed: {err}");
                    loading.set(false);
                    error.set(Some(err.to_string()));
                }
            }
        });
    };

    rsx! {
        div {
            class: "flex flex-col items-center justify-center min-h-[70vh] p-8",

            h1 {
                class: "mb-2 text-neutral-800 font-bold text-[1.75rem]",
                "Create Account"
            }

            form {
                onsubmit: handle_register,
                class: "flex flex-col gap-3 w-full max-w-[320px]",

                if let Some(err) = error() {
                    div {
                        class: "px-2.5 py-2.5 bg-red-50 border border-red-200 rounded text-red-600 text-[0.8125rem]",
                        "{err}"
                    }
                }
                if let Some(message) = notice() {
                    div {
                        class: "px-2.5 py-2.5 bg-green-50 border border-green-200 rounded text-green-700 text-[0.8125rem]",
                        "{message}"
                    }
                }

                input {
                    class: "w-full border rounded px-3 py-2",
                    r#type: "text",
                    placeholder: "Name",
                    value: name(),
                    oninput: move |evt: FormEvent| name.set(evt.value()),
                }
                input {
                    class: "w-full border rounded px-3 py-2",
                    r#type: "email",
                    placeholder: "Email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }
                input {
                    class: "w-full border rounded px-3 py-2",
                    r#type: "password",
                    placeholder: "Password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }
                input {
                    class: "w-full border rounded px-3 py-2",
                    r#type: "password",
                    placeholder: "Confirm password",
                    value: confirm_password(),
                    oninput: move |evt: FormEvent| confirm_password.set(evt.value()),
                }

                button {
                    class: "w-full rounded bg-neutral-800 text-white py-2",
                    r#type: "submit",
                    disabled: loading(),
                    if loading() { "Creating account..." } else { "Create account" }
                }
            }

            p {
                class: "mt-4 text-sm text-neutral-600",
                "Already registered? "
                Link { to: Route::Login {}, "Sign in" }
            }
        }
    }
}
