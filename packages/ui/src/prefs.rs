//! Theme and sidebar preferences.

use dioxus::prelude::*;
use store::prefs::{load_theme, toggle_theme};
use store::{SidebarState, Theme};

use crate::app::{use_app, LocalStore};

/// Current theme, persisted in local storage.
pub type ThemeSignal = Signal<Theme>;
/// Sidebar open state for this page load.
pub type SidebarSignal = Signal<SidebarState>;

/// Apply `theme` to the document root.
pub fn apply_theme(theme: Theme) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(root) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        {
            root.set_class_name(theme.as_str());
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        tracing::debug!("Theme set to {theme}");
    }
}

/// Provide the theme and sidebar signals, restoring the stored theme.
pub(crate) fn use_preferences_provider(local: &LocalStore) {
    let theme = load_theme(local);
    use_context_provider(|| Signal::new(theme));
    use_context_provider(|| Signal::new(SidebarState::default()));
    use_effect(move || apply_theme(theme));
}

pub fn use_theme() -> ThemeSignal {
    use_context::<ThemeSignal>()
}

pub fn use_sidebar() -> SidebarSignal {
    use_context::<SidebarSignal>()
}

/// Button switching between light and dark.
#[component]
pub fn ThemeToggle(#[props(default = "".to_string())] class: String) -> Element {
    let app = use_app();
    let mut theme = use_theme();

    let onclick = move |_| match toggle_theme(&app.local) {
        Ok(next) => {
            apply_theme(next);
            theme.set(next);
        }
        Err(e) => tracing::error!("Failed to store theme: {e}"),
    };

    let label = match theme() {
        Theme::Light => "Dark mode",
        Theme::Dark => "Light mode",
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}

/// Button opening and closing the sidebar.
#[component]
pub fn SidebarToggle(#[props(default = "".to_string())] class: String) -> Element {
    let mut sidebar = use_sidebar();
    rsx! {
        button {
            class: "{class}",
            onclick: move |_| sidebar.write().toggle(),
            if sidebar().open { "Hide menu" } else { "Show menu" }
        }
    }
}
