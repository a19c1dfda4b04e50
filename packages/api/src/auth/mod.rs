//! Authentication: the identity provider seam and its implementations.

mod config;
mod memory;
mod provider;
mod supabase;

pub use config::SupabaseConfig;
pub use memory::MemoryIdentity;
pub use provider::{AccessToken, IdentityProvider};
pub use supabase::SupabaseAuth;
