//! The identity provider seam and the shared access-token cell.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::{Map, Value};

use crate::error::ProviderError;
use crate::models::{AuthUser, Session};

/// External service issuing and describing sessions.
///
/// `get_session` reports whether someone is signed in (`Ok(None)` when not);
/// `get_user` and `update_user` require an active session.
pub trait IdentityProvider {
    fn get_session(&self) -> impl Future<Output = Result<Option<Session>, ProviderError>>;

    fn get_user(&self) -> impl Future<Output = Result<AuthUser, ProviderError>>;

    /// Merge `attrs` into the user's editable metadata.
    fn update_user(
        &self,
        attrs: Map<String, Value>,
    ) -> impl Future<Output = Result<AuthUser, ProviderError>>;
}

/// Bearer token of the current session, shared between the auth client and
/// the remote store client.
#[derive(Clone, Debug, Default)]
pub struct AccessToken(Arc<RwLock<Option<String>>>);

impl AccessToken {
    pub fn get(&self) -> Option<String> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn clear(&self) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
