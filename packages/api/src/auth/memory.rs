//! In-memory identity provider for tests and offline use.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value};

use super::provider::IdentityProvider;
use crate::error::ProviderError;
use crate::models::{AuthUser, Session};

#[derive(Debug, Default)]
struct Inner {
    session: Option<Session>,
    failing: bool,
    hanging: bool,
}

/// Identity provider backed by a shared in-process session.
///
/// Clones share state, so a test can keep a handle and flip the session or
/// inject failures while the gate holds another.
#[derive(Clone, Debug, Default)]
pub struct MemoryIdentity {
    inner: Arc<Mutex<Inner>>,
    calls: Arc<AtomicUsize>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider with `user` signed in.
    pub fn signed_in(user: AuthUser) -> Self {
        let identity = Self::new();
        identity.sign_in(user);
        identity
    }

    pub fn sign_in(&self, user: AuthUser) {
        self.set_session(Some(Session {
            access_token: format!("token-{}", user.id),
            refresh_token: format!("refresh-{}", user.id),
            expires_at: None,
            user,
        }));
    }

    pub fn set_session(&self, session: Option<Session>) {
        self.lock().session = session;
    }

    /// Make every call fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Make every call never settle.
    pub fn set_hanging(&self, hanging: bool) {
        self.lock().hanging = hanging;
    }

    /// Number of provider calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn enter(&self) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (failing, hanging) = {
            let inner = self.lock();
            (inner.failing, inner.hanging)
        };
        if hanging {
            std::future::pending::<()>().await;
        }
        if failing {
            return Err(ProviderError::Transport("provider unreachable".to_string()));
        }
        Ok(())
    }
}

impl IdentityProvider for MemoryIdentity {
    async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
        self.enter().await?;
        Ok(self.lock().session.clone())
    }

    async fn get_user(&self) -> Result<AuthUser, ProviderError> {
        self.enter().await?;
        self.lock()
            .session
            .as_ref()
            .map(|s| s.user.clone())
            .ok_or(ProviderError::NoSession)
    }

    async fn update_user(&self, attrs: Map<String, Value>) -> Result<AuthUser, ProviderError> {
        self.enter().await?;
        let mut inner = self.lock();
        let session = inner.session.as_mut().ok_or(ProviderError::NoSession)?;
        session.user.user_metadata.extend(attrs);
        Ok(session.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> AuthUser {
        AuthUser {
            id: "u1".to_string(),
            ..AuthUser::default()
        }
    }

    #[tokio::test]
    async fn test_session_roundtrip() {
        let identity = MemoryIdentity::new();
        assert!(identity.get_session().await.unwrap().is_none());
        assert!(matches!(identity.get_user().await, Err(ProviderError::NoSession)));

        identity.sign_in(user());
        let session = identity.get_session().await.unwrap().unwrap();
        assert_eq!(session.user.id, "u1");
        assert_eq!(identity.calls(), 3);
    }

    #[tokio::test]
    async fn test_update_merges_metadata() {
        let identity = MemoryIdentity::signed_in(user());
        let mut attrs = Map::new();
        attrs.insert("name".to_string(), json!("Ana"));
        let updated = identity.update_user(attrs).await.unwrap();
        assert_eq!(updated.metadata_str("name"), Some("Ana"));
        assert_eq!(identity.get_user().await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let identity = MemoryIdentity::signed_in(user());
        identity.set_failing(true);
        assert!(matches!(identity.get_session().await, Err(ProviderError::Transport(_))));
    }
}
