//! Cached projection of the signed-in user for profile and settings views.
//!
//! The projection is refreshed on every provider query and only ever used for
//! rendering; the session gate asks the provider directly.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::auth::IdentityProvider;
use crate::error::ProviderError;
use crate::models::UserData;
use crate::remote::ObjectStorage;
use crate::timeout::with_timeout;

/// Storage bucket holding profile images.
pub const PROFILE_IMAGES_BUCKET: &str = "profile-images";

pub struct AuthUserStore<I> {
    identity: I,
    timeout: Duration,
    user: Mutex<Option<UserData>>,
}

impl<I: IdentityProvider> AuthUserStore<I> {
    pub fn new(identity: I, timeout: Duration) -> Self {
        Self {
            identity,
            timeout,
            user: Mutex::new(None),
        }
    }

    fn cached(&self) -> MutexGuard<'_, Option<UserData>> {
        self.user.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The last projection, if any.
    pub fn user_data(&self) -> Option<UserData> {
        self.cached().clone()
    }

    /// Whether someone is signed in. Refreshes the projection when they are.
    pub async fn is_authenticated(&self) -> bool {
        let result: Result<_, ProviderError> =
            with_timeout(self.timeout, self.identity.get_session())
                .await
                .map_err(ProviderError::from)
                .and_then(|r| r);
        match result {
            Ok(Some(session)) => {
                *self.cached() = Some(UserData::from(&session.user));
                true
            }
            Ok(None) => {
                *self.cached() = None;
                false
            }
            Err(e) => {
                warn!("Session check failed: {e}");
                false
            }
        }
    }

    /// Fetch the user from the provider and replace the projection.
    pub async fn get_user_information(&self) -> Option<UserData> {
        let result = with_timeout(self.timeout, self.identity.get_user()).await;
        match result.map_err(ProviderError::from).and_then(|r| r) {
            Ok(user) => {
                let data = UserData::from(&user);
                *self.cached() = Some(data.clone());
                Some(data)
            }
            Err(e) => {
                warn!("Failed to fetch user information: {e}");
                None
            }
        }
    }

    /// Merge `attrs` into the user's profile metadata.
    pub async fn update_user_information(
        &self,
        attrs: Map<String, Value>,
    ) -> Result<UserData, ProviderError> {
        let user = with_timeout(self.timeout, self.identity.update_user(attrs)).await??;
        let data = UserData::from(&user);
        debug!("Updated profile of {}", data.id);
        *self.cached() = Some(data.clone());
        Ok(data)
    }

    /// Upload `bytes` as the user's profile image and point the `image_url`
    /// metadata at its public URL.
    ///
    /// The object lands at `public/<user id>/<file name>` and replaces any
    /// earlier upload of the same name.
    pub async fn upload_user_image<F: ObjectStorage>(
        &self,
        storage: &F,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<UserData, ProviderError> {
        let user_id = match self.user_data() {
            Some(user) => user.id,
            None => with_timeout(self.timeout, self.identity.get_user()).await??.id,
        };
        let file_name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
        let path = format!("public/{user_id}/{file_name}");

        let stored = with_timeout(
            self.timeout,
            storage.upload(PROFILE_IMAGES_BUCKET, &path, bytes, content_type),
        )
        .await??;
        let url = storage.public_url(PROFILE_IMAGES_BUCKET, &stored);
        debug!("Uploaded profile image to {url}");

        let mut attrs = Map::new();
        attrs.insert("image_url".to_string(), Value::String(url));
        self.update_user_information(attrs).await
    }

    /// Role label of the cached user.
    pub fn user_role(&self) -> String {
        self.cached()
            .as_ref()
            .map(UserData::role_label)
            .unwrap_or_else(|| "User".to_string())
    }

    /// Forget the projection (sign-out).
    pub fn reset(&self) {
        *self.cached() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryIdentity;
    use crate::models::AuthUser;
    use crate::remote::MemoryRemote;
    use serde_json::json;

    fn ana(metadata: Value) -> AuthUser {
        AuthUser {
            id: "u1".to_string(),
            email: Some("ana@example.com".to_string()),
            user_metadata: metadata.as_object().cloned().unwrap_or_default(),
            ..AuthUser::default()
        }
    }

    fn store(identity: &MemoryIdentity) -> AuthUserStore<MemoryIdentity> {
        AuthUserStore::new(identity.clone(), Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_is_authenticated_refreshes_projection() {
        let identity = MemoryIdentity::signed_in(ana(json!({ "name": "Ana" })));
        let users = store(&identity);
        assert!(users.is_authenticated().await);
        assert_eq!(users.user_data().map(|u| u.name), Some("Ana".to_string()));

        identity.set_session(None);
        assert!(!users.is_authenticated().await);
        assert!(users.user_data().is_none());
    }

    #[tokio::test]
    async fn test_provider_failure_is_not_authenticated() {
        let identity = MemoryIdentity::signed_in(ana(json!({})));
        identity.set_failing(true);
        let users = store(&identity);
        assert!(!users.is_authenticated().await);
        assert!(users.get_user_information().await.is_none());
    }

    #[tokio::test]
    async fn test_update_returns_error_and_rebuilds_projection() {
        let identity = MemoryIdentity::new();
        let users = store(&identity);
        let mut attrs = Map::new();
        attrs.insert("name".to_string(), json!("Ana"));
        assert!(matches!(
            users.update_user_information(attrs.clone()).await,
            Err(ProviderError::NoSession)
        ));

        identity.sign_in(ana(json!({ "is_admin": true })));
        let data = users.update_user_information(attrs).await.unwrap();
        assert_eq!(data.name, "Ana");
        assert_eq!(users.user_role(), "Super Administrator");
    }

    #[tokio::test]
    async fn test_reset_and_default_role() {
        let identity = MemoryIdentity::signed_in(ana(json!({ "user_role": "Seller" })));
        let users = store(&identity);
        assert_eq!(users.user_role(), "User");
        users.get_user_information().await;
        assert_eq!(users.user_role(), "Seller");

        users.reset();
        assert!(users.user_data().is_none());
        assert_eq!(users.user_role(), "User");
    }

    #[tokio::test]
    async fn test_upload_user_image_sets_image_url() {
        let identity = MemoryIdentity::signed_in(ana(json!({ "name": "Ana" })));
        let users = store(&identity);
        let storage = MemoryRemote::new();

        let data = users
            .upload_user_image(&storage, "me.png", vec![7, 7], "image/png")
            .await
            .unwrap();
        assert_eq!(data.image_url, "memory://profile-images/public/u1/me.png");
        assert_eq!(storage.object(PROFILE_IMAGES_BUCKET, "public/u1/me.png"), Some(vec![7, 7]));
        assert_eq!(
            identity.get_user().await.unwrap().metadata_str("image_url"),
            Some("memory://profile-images/public/u1/me.png")
        );
        assert_eq!(users.user_data().map(|u| u.image_url), Some(data.image_url));
    }

    #[tokio::test]
    async fn test_upload_user_image_failures() {
        let identity = MemoryIdentity::new();
        let users = store(&identity);
        let storage = MemoryRemote::new();
        assert!(matches!(
            users.upload_user_image(&storage, "me.png", vec![1], "image/png").await,
            Err(ProviderError::NoSession)
        ));

        identity.sign_in(ana(json!({ "image_url": "/old.png" })));
        storage.set_fail_writes(true);
        assert!(matches!(
            users.upload_user_image(&storage, "me.png", vec![1], "image/png").await,
            Err(ProviderError::Upload(_))
        ));
        assert_eq!(identity.get_user().await.unwrap().metadata_str("image_url"), Some("/old.png"));
    }
}
