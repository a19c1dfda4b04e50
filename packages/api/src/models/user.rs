//! # User and session models
//!
//! Defines the representations of the signed-in user as they flow from the
//! identity provider into the client:
//!
//! ## [`AuthUser`]
//!
//! The user object returned by the identity provider: an opaque `id`, the
//! `email`, and two free-form metadata maps. `user_metadata` is editable by the
//! user (display name, avatar) and carries the `is_admin` role flag;
//! `app_metadata` is provider-managed.
//!
//! ## [`Session`]
//!
//! An issued session: bearer `access_token`, `refresh_token`, absolute expiry
//! (`expires_at`, Unix seconds) and the [`AuthUser`] it belongs to.
//!
//! ## [`SessionState`]
//!
//! The collapsed answer to "who is navigating?" used by the session gate:
//! `LoggedIn` with the user, or `LoggedOut`.
//!
//! ## [`UserData`]
//!
//! The client's cached projection of the user for rendering. It is refreshed on
//! every provider query and is never used as authorization proof. The helper
//! [`UserData::display_name`] returns the name or falls back to the email.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DEFAULT_AVATAR: &str = "/default-avatar.jpg";
const UNKNOWN_USER: &str = "Unknown User";

/// JavaScript-style truthiness of a metadata value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// User object as returned by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
    #[serde(default)]
    pub app_metadata: Map<String, Value>,
}

impl AuthUser {
    /// Whether the user carries the admin role flag.
    pub fn is_admin(&self) -> bool {
        self.user_metadata.get("is_admin").is_some_and(is_truthy)
    }

    /// A string-valued user metadata attribute, ignoring empty strings.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// An issued session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry in Unix seconds
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl Session {
    /// Whether the access token is expired, or will be within `leeway_secs`.
    pub fn is_expired(&self, now_secs: i64, leeway_secs: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at <= now_secs + leeway_secs)
    }
}

/// Result of a session query, collapsed for navigation decisions.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn(AuthUser),
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionState::LoggedIn(_))
    }

    /// Whether the session belongs to an admin. Always `false` when logged out.
    pub fn is_admin(&self) -> bool {
        match self {
            SessionState::LoggedIn(user) => user.is_admin(),
            SessionState::LoggedOut => false,
        }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            SessionState::LoggedIn(user) => Some(user),
            SessionState::LoggedOut => None,
        }
    }
}

impl From<Option<Session>> for SessionState {
    fn from(session: Option<Session>) -> Self {
        match session {
            Some(session) => SessionState::LoggedIn(session.user),
            None => SessionState::LoggedOut,
        }
    }
}

/// Cached projection of the signed-in user for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub id: String,
    pub email: String,
    pub name: String,
    pub image_url: String,
    pub is_admin: bool,
    pub user_role: Option<String>,
    /// Remaining free-form profile attributes
    pub extra: Map<String, Value>,
}

impl UserData {
    /// Get display name, falling back to email if name is unknown.
    pub fn display_name(&self) -> &str {
        if self.name == UNKNOWN_USER && !self.email.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }

    /// Human-readable role label.
    pub fn role_label(&self) -> String {
        if self.is_admin {
            "Super Administrator".to_string()
        } else {
            self.user_role.clone().unwrap_or_else(|| "User".to_string())
        }
    }
}

impl From<&AuthUser> for UserData {
    fn from(user: &AuthUser) -> Self {
        let name = user
            .metadata_str("full_name")
            .or_else(|| user.metadata_str("name"))
            .unwrap_or(UNKNOWN_USER)
            .to_string();
        let image_url = user
            .metadata_str("image_url")
            .or_else(|| user.metadata_str("avatar_url"))
            .unwrap_or(DEFAULT_AVATAR)
            .to_string();
        let extra = user
            .user_metadata
            .iter()
            .filter(|(k, _)| {
                !matches!(
                    k.as_str(),
                    "full_name" | "name" | "image_url" | "avatar_url" | "is_admin" | "user_role"
                )
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        UserData {
            id: user.id.clone(),
            email: user.email.clone().unwrap_or_default(),
            name,
            image_url,
            is_admin: user.is_admin(),
            user_role: user.metadata_str("user_role").map(str::to_string),
            extra,
        }
    }
}
