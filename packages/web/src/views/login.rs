//! Login page view with email/password form.

use api::validators;
use dioxus::prelude::*;
use ui::{restore_session, use_app, use_auth, use_saved_products};

use crate::Route;

/// Login page component.
#[component]
pub fn Login() -> Element {
    let app = use_app();
    let auth = use_auth();
    let saved = use_saved_products().items();
    let nav = use_navigator();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut loading = use_signal(|| false);

    let handle_login = move |evt: FormEvent| {
        evt.prevent_default();
        let app = app.clone();
        spawn(async move {
            error.set(None);

            let e = email().trim().to_string();
            let p = password();
            let checks = validators::required(&e)
                .and_then(|_| validators::email(&e))
                .and_then(|_| validators::required(&p));
            if let Err(message) = checks {
                error.set(Some(message));
                return;
            }

            loading.set(true);
            match app.identity.sign_in_with_password(&e, &p).await {
                Ok(_) => {
                    let user = restore_session(&app, auth, saved).await;
                    loading.set(false);
                    match user {
                        Some(user) if user.is_admin => nav.replace(Route::Admin {}),
                        _ => nav.replace(Route::Home {}),
                    };
                }
                Err(e) => {
                    tracing::warn!("Sign-in failed: {e}");
                    loading.set(false);
                    error.set(Some("Invalid email or password".to_string()));
                }
            }
        });
    };

    rsx! {
        div {
            class: "flex flex-col items-center justify-center min-h-[70vh] p-8",

            h1 {
                class: "mb-2 text-neutral-800 font-bold text-[1.75rem]",
                "Sign in"
            }

            form {
                onsubmit: handle_login,
                class: "flex flex-col gap-3 w-full max-w-[320px]",

                if let Some(err) = error() {
                    div {
                        class: "px-2.5 py-2.5 bg-red-50 border border-red-200 rounded text-red-600 text-[0.8125rem]",
                        "{err}"
                    }
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

                button {
                    class: "w-full rounded bg-neutral-800 text-white py-2",
                    r#type: "submit",
                    disabled: loading(),
                    if loading() { "Signing in..." } else { "Sign in" }
                }
            }

            p {
                class: "mt-4 text-sm text-neutral-600",
                "No account yet? "
                Link { to: Route::Register {}, "Create one" }
            }
        }
    }
}
