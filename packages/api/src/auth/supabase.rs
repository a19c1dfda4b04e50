//! # Hosted auth client
//!
//! [`SupabaseAuth`] is the [`IdentityProvider`] used by the application. It talks
//! to the hosted auth REST API (`/auth/v1/*`) and keeps the issued session on the
//! device so a reload does not sign the user out.
//!
//! ## Session persistence
//!
//! The current [`Session`] is stored as JSON under the configured session key of
//! a [`KeyValueStore`]. [`get_session`](IdentityProvider::get_session) reads it
//! back, refreshes it with the refresh-token grant when the access token is
//! about to expire, and publishes the bearer token to the shared
//! [`AccessToken`] cell used by the remote store client.
//!
//! ## Endpoints
//!
//! | Method | Endpoint |
//! |--------|----------|
//! | [`sign_in_with_password`](SupabaseAuth::sign_in_with_password) | `POST /token?grant_type=password` |
//! | [`sign_up`](SupabaseAuth::sign_up) | `POST /signup` |
//! | [`sign_out`](SupabaseAuth::sign_out) | `POST /logout` |
//! | refresh | `POST /token?grant_type=refresh_token` |
//! | [`get_user`](IdentityProvider::get_user) | `GET /user` |
//! | [`update_user`](IdentityProvider::update_user) | `PUT /user` |

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use store::models::current_timestamp_ms;
use store::KeyValueStore;

use super::config::SupabaseConfig;
use super::provider::{AccessToken, IdentityProvider};
use crate::error::ProviderError;
use crate::models::{AuthUser, Session};

/// Refresh this many seconds before the access token actually expires.
const EXPIRY_LEEWAY_SECS: i64 = 30;

/// Token grant response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self, now_secs: i64) -> Session {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| now_secs + secs));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Sign-up either yields a session right away or only a user awaiting email
/// confirmation.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

/// Extract a human-readable message from an auth error body.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

fn now_secs() -> i64 {
    current_timestamp_ms() / 1000
}

/// Hosted auth client with device-persisted session.
#[derive(Clone)]
pub struct SupabaseAuth<S: KeyValueStore> {
    http: Client,
    config: SupabaseConfig,
    store: S,
    session_key: String,
    token: AccessToken,
}

impl<S: KeyValueStore> SupabaseAuth<S> {
    pub fn new(config: SupabaseConfig, store: S, session_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            config,
            store,
            session_key: session_key.into(),
            token: AccessToken::default(),
        }
    }

    /// The bearer-token cell to hand to the remote store client.
    pub fn access_token(&self) -> AccessToken {
        self.token.clone()
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.anon_key)
            .header("Content-Type", "application/json")
    }

    async fn check(response: Response) -> Result<Response, ProviderError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::Status {
            status,
            message: error_message(&body),
        })
    }

    fn stored_session(&self) -> Option<Session> {
        let raw = self.store.get(&self.session_key)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("Discarding unreadable stored session: {e}");
                None
            }
        }
    }

    fn persist_session(&self, session: &Session) -> Result<(), ProviderError> {
        let raw = serde_json::to_string(session)?;
        self.store.set(&self.session_key, &raw)?;
        self.token.set(&session.access_token);
        Ok(())
    }

    fn drop_session(&self) {
        self.token.clear();
        if let Err(e) = self.store.remove(&self.session_key) {
            tracing::error!("Failed to remove stored session: {e}");
        }
    }

    /// Store a fresh copy of `user` inside the persisted session.
    fn replace_session_user(&self, user: &AuthUser) {
        if let Some(mut session) = self.stored_session() {
            session.user = user.clone();
            if let Err(e) = self.persist_session(&session) {
                tracing::error!("Failed to persist refreshed user: {e}");
            }
        }
    }

    async fn grant(&self, grant_type: &str, body: Value) -> Result<Session, ProviderError> {
        let url = self.config.auth_url(&format!("token?grant_type={grant_type}"));
        let response = self
            .request(self.http.post(url))
            .json(&body)
            .send()
            .await?;
        let token: TokenResponse = Self::check(response).await?.json().await?;
        Ok(token.into_session(now_secs()))
    }

    async fn refresh(&self, session: &Session) -> Result<Session, ProviderError> {
        tracing::debug!("Refreshing session for {}", session.user.id);
        let refreshed = self
            .grant(
                "refresh_token",
                json!({ "refresh_token": session.refresh_token }),
            )
            .await?;
        self.persist_session(&refreshed)?;
        Ok(refreshed)
    }

    fn bearer(&self) -> Result<String, ProviderError> {
        self.stored_session()
            .map(|s| s.access_token)
            .ok_or(ProviderError::NoSession)
    }

    /// Sign in with email and password and persist the issued session.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError> {
        let session = self
            .grant(
                "password",
                json!({ "email": email.trim(), "password": password }),
            )
            .await?;
        self.persist_session(&session)?;
        tracing::info!("Signed in as {}", session.user.id);
        Ok(session)
    }

    /// Register a new account. Returns the session when the backend signs the
    /// user in immediately, or `None` when email confirmation is pending.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Map<String, Value>,
    ) -> Result<Option<Session>, ProviderError> {
        let response = self
            .request(self.http.post(self.config.auth_url("signup")))
            .json(&json!({ "email": email.trim(), "password": password, "data": metadata }))
            .send()
            .await?;
        match Self::check(response).await?.json::<SignUpResponse>().await? {
            SignUpResponse::Session(token) => {
                let session = token.into_session(now_secs());
                self.persist_session(&session)?;
                Ok(Some(session))
            }
            SignUpResponse::User(user) => {
                tracing::info!("Registered {}, awaiting email confirmation", user.id);
                Ok(None)
            }
        }
    }

    /// Revoke the session remotely (best effort) and forget it locally.
    pub async fn sign_out(&self) {
        if let Some(session) = self.stored_session() {
            let result = self
                .request(self.http.post(self.config.auth_url("logout")))
                .bearer_auth(&session.access_token)
                .send()
                .await;
            match result {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!("Logout returned {}", response.status());
                }
                Err(e) => tracing::warn!("Logout request failed: {e}"),
                Ok(_) => {}
            }
        }
        self.drop_session();
    }
}

impl<S: KeyValueStore> IdentityProvider for SupabaseAuth<S> {
    async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
        let Some(session) = self.stored_session() else {
            self.token.clear();
            return Ok(None);
        };
        if !session.is_expired(now_secs(), EXPIRY_LEEWAY_SECS) {
            self.token.set(&session.access_token);
            return Ok(Some(session));
        }
        match self.refresh(&session).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(ProviderError::Status { status, message }) if (400..500).contains(&status) => {
                // The refresh token was rejected: the session is gone for good.
                tracing::info!("Stored session rejected ({status}): {message}");
                self.drop_session();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn get_user(&self) -> Result<AuthUser, ProviderError> {
        let token = self.bearer()?;
        let response = self
            .request(self.http.get(self.config.auth_url("user")))
            .bearer_auth(token)
            .send()
            .await?;
        let user: AuthUser = Self::check(response).await?.json().await?;
        self.replace_session_user(&user);
        Ok(user)
    }

    async fn update_user(&self, attrs: Map<String, Value>) -> Result<AuthUser, ProviderError> {
        let token = self.bearer()?;
        let response = self
            .request(self.http.put(self.config.auth_url("user")))
            .bearer_auth(token)
            .json(&json!({ "data": attrs }))
            .send()
            .await?;
        let user: AuthUser = Self::check(response).await?.json().await?;
        self.replace_session_user(&user);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MemoryStore;

    fn auth(store: MemoryStore) -> SupabaseAuth<MemoryStore> {
        SupabaseAuth::new(
            SupabaseConfig::new("http://127.0.0.1:9", "anon"),
            store,
            "sb-session",
        )
    }

    fn session(expires_at: Option<i64>) -> Session {
        Session {
            access_token: "jwt".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
            user: AuthUser {
                id: "u1".to_string(),
                ..AuthUser::default()
            },
        }
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(error_message(r#"{"code":422,"msg":"User already registered"}"#), "User already registered");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_token_response_expiry() {
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 3600,
            "user": { "id": "u1" }
        }))
        .unwrap();
        assert_eq!(token.into_session(100).expires_at, Some(3700));
    }

    #[test]
    fn test_sign_up_response_shapes() {
        let pending: SignUpResponse =
            serde_json::from_value(json!({ "id": "u1", "email": "a@b.co" })).unwrap();
        assert!(matches!(pending, SignUpResponse::User(_)));

        let immediate: SignUpResponse = serde_json::from_value(json!({
            "access_token": "a", "refresh_token": "r", "user": { "id": "u1" }
        }))
        .unwrap();
        assert!(matches!(immediate, SignUpResponse::Session(_)));
    }

    #[tokio::test]
    async fn test_no_stored_session_is_logged_out() {
        let auth = auth(MemoryStore::new());
        assert!(auth.get_session().await.unwrap().is_none());
        assert!(auth.access_token().get().is_none());
        assert!(matches!(auth.get_user().await, Err(ProviderError::NoSession)));
    }

    #[tokio::test]
    async fn test_valid_stored_session_publishes_token() {
        let store = MemoryStore::new();
        store
            .set("sb-session", &serde_json::to_string(&session(None)).unwrap())
            .unwrap();

        let auth = auth(store);
        let current = auth.get_session().await.unwrap().unwrap();
        assert_eq!(current.user.id, "u1");
        assert_eq!(auth.access_token().get().as_deref(), Some("jwt"));
    }

    #[tokio::test]
    async fn test_expired_session_with_unreachable_backend_is_error() {
        let store = MemoryStore::new();
        store
            .set("sb-session", &serde_json::to_string(&session(Some(1))).unwrap())
            .unwrap();

        let auth = auth(store.clone());
        assert!(auth.get_session().await.is_err());
        // A transport failure keeps the session for the next attempt
        assert!(store.get("sb-session").is_some());
    }

    #[tokio::test]
    async fn test_sign_out_forgets_session() {
        let store = MemoryStore::new();
        store
            .set("sb-session", &serde_json::to_string(&session(None)).unwrap())
            .unwrap();

        let auth = auth(store.clone());
        auth.get_session().await.unwrap();
        auth.sign_out().await;
        assert!(store.get("sb-session").is_none());
        assert!(auth.access_token().get().is_none());
    }
}
