use dioxus::prelude::*;
use ui::{use_auth, use_sidebar, GateView, LogoutButton, SidebarToggle, ThemeToggle};

use crate::Route;

/// Layout running the session gate before any routed view renders.
#[component]
pub fn Guarded() -> Element {
    let route = use_route::<Route>();
    let Some(name) = route.name() else {
        return rsx! { Outlet::<Route> {} };
    };

    rsx! {
        Navbar {}
        GateView {
            route: name,
            Outlet::<Route> {}
        }
    }
}

#[component]
fn Navbar() -> Element {
    let auth = use_auth();
    let sidebar = use_sidebar();
    let user = auth().user;

    rsx! {
        nav {
            class: "flex items-center gap-4 px-6 py-3 border-b border-neutral-200",
            SidebarToggle { class: "text-sm" }
            if sidebar().open {
                div {
                    class: "flex gap-4",
                    Link { to: Route::Home {}, "Home" }
                    if let Some(user) = &user {
                        Link { to: Route::Saved {}, "Saved" }
                        Link { to: Route::Profile {}, "Profile" }
                        Link { to: Route::Settings {}, "Settings" }
                        if user.is_admin {
                            Link { to: Route::Admin {}, "Admin" }
                        }
                    }
                }
            }
            div {
                class: "ml-auto flex items-center gap-3",
                ThemeToggle { class: "text-sm" }
                if user.is_some() {
                    LogoutButton { class: "text-sm" }
                } else {
                    Link { to: Route::Login {}, "Login" }
                }
            }
        }
    }
}

#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        div {
            class: "p-8",
            h1 { class: "text-xl font-bold", "Page not found" }
            p { "Nothing lives at /{path}." }
            Link { to: Route::Landing {}, "Back to the start" }
        }
    }
}
