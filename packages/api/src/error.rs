//! Error types for the identity provider and the remote data store.
//!
//! Neither type crosses the public boundary of the session gate or the
//! saved-products synchronizer: both collapse them into a safe default and log.

use std::time::Duration;

use thiserror::Error;

use crate::timeout::Elapsed;

/// Failure while querying or updating the identity provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("identity provider request failed: {0}")]
    Transport(String),

    #[error("identity provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode identity provider response: {0}")]
    Decode(String),

    #[error("no active session")]
    NoSession,

    #[error("identity provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("identity provider not configured: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] store::StoreError),

    #[error("profile image upload failed: {0}")]
    Upload(#[from] RemoteError),
}

/// Failure while talking to the remote data store.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote store request failed: {0}")]
    Transport(String),

    #[error("remote store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode remote store response: {0}")]
    Decode(String),

    #[error("remote store timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::Decode(e.to_string())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else {
            RemoteError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Decode(e.to_string())
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(e: serde_json::Error) -> Self {
        RemoteError::Decode(e.to_string())
    }
}

impl From<Elapsed> for ProviderError {
    fn from(e: Elapsed) -> Self {
        ProviderError::Timeout(e.0)
    }
}

impl From<Elapsed> for RemoteError {
    fn from(e: Elapsed) -> Self {
        RemoteError::Timeout(e.0)
    }
}
