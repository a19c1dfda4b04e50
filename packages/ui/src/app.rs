//! Application state shared by every view.
//!
//! [`AppContext`] owns the identity client, the session gate, the auth-user
//! store, the saved-products synchronizer and the file storage client. It is created once by
//! [`AuthProvider`](crate::AuthProvider) and handed to views through context.
//!
//! Local persistence picks the platform store:
//! - **Web** (WASM + `web` feature): `localStorage` via [`store::LocalStorageStore`]
//! - **Desktop** (native): files under `<data_dir>/marketplace/` via [`store::FileStore`]
//! - **WASM without `web`**: in-memory [`store::MemoryStore`]

use std::rc::Rc;

use api::auth::{SupabaseAuth, SupabaseConfig};
use api::remote::RestStore;
use api::{AuthUserStore, SavedProducts, SessionGate};
use dioxus::prelude::*;
use store::{AppConfig, LocalMirror};

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub type LocalStore = store::LocalStorageStore;
#[cfg(all(target_arch = "wasm32", not(feature = "web")))]
pub type LocalStore = store::MemoryStore;
#[cfg(not(target_arch = "wasm32"))]
pub type LocalStore = store::FileStore;

pub type Identity = SupabaseAuth<LocalStore>;

/// Create the platform-appropriate local store.
pub fn make_local_store() -> LocalStore {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        store::LocalStorageStore::new()
    }
    #[cfg(all(target_arch = "wasm32", not(feature = "web")))]
    {
        store::MemoryStore::new()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        store::FileStore::new(data_dir())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn data_dir() -> std::path::PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("marketplace")
}

/// Read `marketplace.toml` from the data directory, or use the defaults.
pub fn load_config() -> AppConfig {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let path = data_dir().join(AppConfig::filename());
        match std::fs::read_to_string(&path) {
            Ok(raw) => match AppConfig::from_toml(&raw) {
                Ok(config) => return config,
                Err(e) => tracing::error!("Ignoring invalid {}: {e}", path.display()),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to read {}: {e}", path.display()),
        }
    }
    AppConfig::default()
}

/// Long-lived application state.
pub struct AppContext {
    pub config: AppConfig,
    pub local: LocalStore,
    pub identity: Identity,
    pub gate: SessionGate<Identity>,
    pub users: AuthUserStore<Identity>,
    pub saved: SavedProducts<Identity, RestStore, LocalStore>,
    /// Profile image uploads
    pub storage: RestStore,
}

impl AppContext {
    pub fn new(config: AppConfig, local: LocalStore) -> Self {
        let backend = SupabaseConfig::resolve(&config).unwrap_or_else(|e| {
            tracing::error!("Backend not configured, every request will fail: {e}");
            SupabaseConfig::new("", "")
        });
        let timeout = config.sync.request_timeout();
        let identity =
            SupabaseAuth::new(backend.clone(), local.clone(), &config.sync.session_key);
        let remote = RestStore::new(backend, identity.access_token());
        let mirror = LocalMirror::new(local.clone(), &config.sync.mirror_key);

        Self {
            gate: SessionGate::new(identity.clone(), timeout),
            users: AuthUserStore::new(identity.clone(), timeout),
            saved: SavedProducts::new(identity.clone(), remote.clone(), mirror, timeout),
            storage: remote,
            identity,
            local,
            config,
        }
    }
}

/// The application state provided by [`AuthProvider`](crate::AuthProvider).
pub fn use_app() -> Rc<AppContext> {
    use_context::<Rc<AppContext>>()
}
