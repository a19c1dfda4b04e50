//! # API crate — session gate and saved-products sync for the marketplace client
//!
//! Everything that talks to the hosted backend lives here, together with the
//! two pieces of client logic that decide what the user may see and keep their
//! saved listings consistent across devices.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | `IdentityProvider` seam, hosted auth client (`SupabaseAuth`), in-memory fake |
//! | [`remote`] | `RemoteStore` seam over table queries, PostgREST client, in-memory fake |
//! | [`gate`] | Navigation decision table and the fail-closed `SessionGate` |
//! | [`saved`] | Local-first `SavedProducts` synchronizer with pending-write journal |
//! | [`session`] | `AuthUserStore`, the cached user projection for profile views |
//! | [`routes`] | Static route table |
//! | [`validators`] | Form field validators |
//! | [`models`] | Session, user and projection types |
//!
//! Every provider and remote call made by the gate and the synchronizer is
//! bounded by [`timeout::with_timeout`]. Their public operations never return
//! an error: failures are logged through `tracing` and collapsed to a safe
//! default.

pub mod auth;
pub mod error;
pub mod gate;
pub mod models;
pub mod remote;
pub mod routes;
pub mod saved;
pub mod session;
pub mod timeout;
pub mod validators;

pub use error::{ProviderError, RemoteError};
pub use gate::{decide, Decision, SessionGate};
pub use models::{AuthUser, Session, SessionState, UserData};
pub use routes::{RouteDescriptor, RouteName, ROUTES};
pub use saved::SavedProducts;
pub use session::AuthUserStore;

pub use store::{AppConfig, SavedItem};
