use api::RouteName;
use dioxus::prelude::*;

use ui::AuthProvider;
use views::{Admin, Guarded, Home, Landing, Login, NotFound, Profile, Register, Saved, Settings};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Guarded)]
        #[route("/")]
        Landing {},
        #[route("/login")]
        Login {},
        #[route("/register")]
        Register {},
        #[route("/homepage")]
        Home {},
        #[route("/profile")]
        Profile {},
        #[route("/settings")]
        Settings {},
        #[route("/saved")]
        Saved {},
        #[route("/admin")]
        Admin {},
    #[end_layout]
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

impl Route {
    /// Entry in the route table, if this route is gated.
    fn name(&self) -> Option<RouteName> {
        match self {
            Route::Landing {} => Some(RouteName::Landing),
            Route::Login {} => Some(RouteName::Login),
            Route::Register {} => Some(RouteName::Register),
            Route::Home {} => Some(RouteName::Home),
            Route::Profile {} => Some(RouteName::Profile),
            Route::Settings {} => Some(RouteName::Settings),
            Route::Saved {} => Some(RouteName::Saved),
            Route::Admin {} => Some(RouteName::Admin),
            Route::NotFound { .. } => None,
        }
    }
}

fn main() {
    if let Err(e) = dioxus::logger::init(tracing::Level::INFO) {
        eprintln!("Failed to initialise logging: {e}");
    }
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        AuthProvider {
            Router::<Route> {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::ROUTES;

    #[test]
    fn test_router_matches_route_table() {
        for descriptor in &ROUTES {
            let route = descriptor.path.parse::<Route>().ok();
            assert_eq!(route.as_ref().and_then(Route::name), Some(descriptor.name));
            assert_eq!(route.map(|r| r.to_string()).as_deref(), Some(descriptor.path));
        }
    }

    #[test]
    fn test_unknown_path_is_not_gated() {
        let route = "/no/such/page".parse::<Route>().ok();
        assert!(matches!(route, Some(Route::NotFound { .. })));
        assert_eq!(route.as_ref().and_then(Route::name), None);
    }
}
