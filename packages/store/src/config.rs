//! # Client configuration — `marketplace.toml`
//!
//! Defines the TOML configuration the client reads at startup (filename:
//! [`AppConfig::filename`] = `"marketplace.toml"`). It names the hosted backend
//! and tunes how the saved-products synchronizer talks to it.
//!
//! ## Structure
//!
//! ```toml
//! [remote]
//! url = "https://project.supabase.co"
//! anon_key = "public-anon-key"
//!
//! [sync]
//! request_timeout_ms = 10000   # bound on every provider / remote call
//! mirror_key = "savedProducts" # local storage key of the saved-set blob
//! session_key = "sb-session"   # local storage key of the auth session
//! ```
//!
//! ## Types
//!
//! | Struct | Purpose |
//! |--------|---------|
//! | [`AppConfig`] | Top-level config. Provides builder helpers (`with_remote`, `with_request_timeout`), TOML (de)serialisation, and the canonical filename. |
//! | [`RemoteConfig`] | Backend base URL and public (anon) API key. Empty by default. |
//! | [`SyncConfig`] | Timeout and storage keys, defaulting to **10 s**, `"savedProducts"` and `"sb-session"`. |
//!
//! All structs derive `Default` so that a missing or empty config file is
//! equivalent to the default configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Top-level configuration stored in `marketplace.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Hosted backend location.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
}

/// Synchronizer tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Upper bound for a single provider or remote call, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_mirror_key")]
    pub mirror_key: String,
    #[serde(default = "default_session_key")]
    pub session_key: String,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_mirror_key() -> String {
    "savedProducts".to_string()
}

fn default_session_key() -> String {
    "sb-session".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            mirror_key: default_mirror_key(),
            session_key: default_session_key(),
        }
    }
}

impl SyncConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl AppConfig {
    /// Builder method to set the backend location.
    pub fn with_remote(mut self, url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        self.remote = RemoteConfig {
            url: url.into(),
            anon_key: anon_key.into(),
        };
        self
    }

    /// Builder method to set the per-request timeout.
    pub fn with_request_timeout(mut self, millis: u64) -> Self {
        self.sync.request_timeout_ms = millis;
        self
    }

    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "marketplace.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, StoreError> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, StoreError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.sync.request_timeout_ms, 10_000);
        assert_eq!(config.sync.mirror_key, "savedProducts");
        assert_eq!(config.sync.session_key, "sb-session");
        assert!(config.remote.url.is_empty());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [remote]
            url = "https://demo.supabase.co"

            [sync]
            request_timeout_ms = 2500
            "#,
        )
        .unwrap();
        assert_eq!(config.remote.url, "https://demo.supabase.co");
        assert_eq!(config.remote.anon_key, "");
        assert_eq!(config.sync.request_timeout(), Duration::from_millis(2500));
        assert_eq!(config.sync.mirror_key, "savedProducts");
    }

    #[test]
    fn test_config_roundtrip() {
        let config = AppConfig::default()
            .with_remote("https://demo.supabase.co", "anon")
            .with_request_timeout(500);
        let text = config.to_toml().unwrap();
        assert_eq!(AppConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(AppConfig::from_toml("[sync\nrequest_timeout_ms = ").is_err());
    }
}
