//! Authentication context and hooks for the UI.

use std::rc::Rc;

use api::{RouteName, UserData};
use dioxus::prelude::*;
use store::SavedItem;

use crate::app::{load_config, make_local_store, use_app, AppContext};
use crate::prefs::use_preferences_provider;

/// Authentication state for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<UserData>,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

/// Get the current authentication state.
/// Returns a signal that updates when the user logs in or out.
pub fn use_auth() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>()
}

/// Provider component that owns the application state.
/// Wrap your app with this component to enable authentication and saved
/// products.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let app = use_context_provider(|| Rc::new(AppContext::new(load_config(), make_local_store())));
    use_preferences_provider(&app.local);
    let auth_state = use_context_provider(|| Signal::new(AuthState::default()));
    let saved: Signal<Vec<SavedItem>> =
        use_context_provider(|| Signal::new(app.saved.items()));

    // Restore the session and the saved set on mount
    let _ = use_resource(move || {
        let app = app.clone();
        async move {
            restore_session(&app, auth_state, saved).await;
        }
    });

    rsx! {
        {children}
    }
}

/// Ask the provider who is signed in, then publish the user and load their
/// saved set. Returns the signed-in user.
pub async fn restore_session(
    app: &AppContext,
    mut auth: Signal<AuthState>,
    mut saved: Signal<Vec<SavedItem>>,
) -> Option<UserData> {
    let user = if app.users.is_authenticated().await {
        app.users.user_data()
    } else {
        None
    };
    if let Some(user) = &user {
        app.saved.load(&user.id).await;
        saved.set(app.saved.items());
    }
    auth.set(AuthState {
        user: user.clone(),
        loading: false,
    });
    user
}

/// Sign out and forget the cached user and the saved set.
pub async fn sign_out(
    app: &AppContext,
    mut auth: Signal<AuthState>,
    mut saved: Signal<Vec<SavedItem>>,
) {
    app.identity.sign_out().await;
    app.users.reset();
    app.saved.reset();
    saved.set(Vec::new());
    auth.set(AuthState {
        user: None,
        loading: false,
    });
}

/// Button to log out the current user.
#[component]
pub fn LogoutButton(
    #[props(default = "Logout".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let app = use_app();
    let auth_state = use_auth();
    let saved = use_context::<Signal<Vec<SavedItem>>>();
    let nav = use_navigator();

    let onclick = move |_| {
        let app = app.clone();
        async move {
            sign_out(&app, auth_state, saved).await;
            nav.replace(RouteName::Login.path());
        }
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}
