//! This crate contains all shared UI state and hooks for the workspace.

mod app;
pub use app::{load_config, make_local_store, use_app, AppContext, Identity, LocalStore};

mod auth;
pub use auth::{restore_session, sign_out, use_auth, AuthProvider, AuthState, LogoutButton};

mod gate;
pub use gate::{use_gate, GateView};

mod prefs;
pub use prefs::{apply_theme, use_sidebar, use_theme, SidebarSignal, SidebarToggle, ThemeSignal, ThemeToggle};

mod saved;
pub use saved::{use_saved_products, SavedProductsHandle};
