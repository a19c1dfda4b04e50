//! # Route table
//!
//! Static descriptors for every navigable view. The table is defined once and
//! never changes at runtime; the session gate only ever reads it.
//!
//! | Name | Path | Requires auth | Admin only |
//! |------|------|---------------|------------|
//! | `landing` | `/` | no | no |
//! | `login` | `/login` | no | no |
//! | `register` | `/register` | no | no |
//! | `home` | `/homepage` | no | no |
//! | `profile` | `/profile` | yes | no |
//! | `settings` | `/settings` | yes | no |
//! | `saved` | `/saved` | yes | no |
//! | `admin` | `/admin` | yes | yes |

use std::fmt;

/// Symbolic route name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RouteName {
    Landing,
    Login,
    Register,
    Home,
    Profile,
    Settings,
    Saved,
    Admin,
}

impl RouteName {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteName::Landing => "landing",
            RouteName::Login => "login",
            RouteName::Register => "register",
            RouteName::Home => "home",
            RouteName::Profile => "profile",
            RouteName::Settings => "settings",
            RouteName::Saved => "saved",
            RouteName::Admin => "admin",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        ROUTES
            .iter()
            .map(|route| route.name)
            .find(|route| route.as_str() == name)
    }

    pub fn descriptor(self) -> &'static RouteDescriptor {
        // Every name has exactly one row; the fallback is unreachable.
        ROUTES
            .iter()
            .find(|route| route.name == self)
            .unwrap_or(&ROUTES[0])
    }

    pub fn path(self) -> &'static str {
        self.descriptor().path
    }

    /// Login and register pages, which signed-in users are sent away from.
    pub fn is_auth_page(self) -> bool {
        matches!(self, RouteName::Login | RouteName::Register)
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static configuration for one route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub name: RouteName,
    pub path: &'static str,
    /// View identifier
    pub view: &'static str,
    pub requires_auth: bool,
    pub admin_only: bool,
}

impl RouteDescriptor {
    const fn public(name: RouteName, path: &'static str, view: &'static str) -> Self {
        Self {
            name,
            path,
            view,
            requires_auth: false,
            admin_only: false,
        }
    }

    const fn protected(name: RouteName, path: &'static str, view: &'static str) -> Self {
        Self {
            name,
            path,
            view,
            requires_auth: true,
            admin_only: false,
        }
    }
}

pub static ROUTES: [RouteDescriptor; 8] = [
    RouteDescriptor::public(RouteName::Landing, "/", "LandingPage"),
    RouteDescriptor::public(RouteName::Login, "/login", "LoginPage"),
    RouteDescriptor::public(RouteName::Register, "/register", "RegisterPage"),
    RouteDescriptor::public(RouteName::Home, "/homepage", "HomePage"),
    RouteDescriptor::protected(RouteName::Profile, "/profile", "ProfilePage"),
    RouteDescriptor::protected(RouteName::Settings, "/settings", "SettingsPage"),
    RouteDescriptor::protected(RouteName::Saved, "/saved", "SavedPage"),
    RouteDescriptor {
        admin_only: true,
        ..RouteDescriptor::protected(RouteName::Admin, "/admin", "AdminPage")
    },
];

/// Look up a descriptor by path, ignoring a trailing slash.
pub fn find_by_path(path: &str) -> Option<&'static RouteDescriptor> {
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    ROUTES.iter().find(|route| route.path == path)
}
