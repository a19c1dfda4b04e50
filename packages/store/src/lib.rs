pub mod config;
pub mod error;
pub mod kv;
pub mod mirror;
pub mod models;
pub mod prefs;

mod memory;
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
mod file_store;
#[cfg(not(target_arch = "wasm32"))]
pub use file_store::FileStore;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod local_storage;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use local_storage::LocalStorageStore;

pub use config::AppConfig;
pub use error::StoreError;
pub use kv::KeyValueStore;
pub use mirror::{LocalMirror, MirrorSnapshot};
pub use models::{PendingKind, PendingOp, SavedItem};
pub use prefs::{SidebarState, Theme};
