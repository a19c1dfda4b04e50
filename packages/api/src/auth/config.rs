//! Hosted backend configuration from environment variables.

use store::AppConfig;

use crate::error::ProviderError;

/// Location of the hosted auth + data backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// Read `SUPABASE_URL` and `SUPABASE_KEY` from the environment (and `.env`).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, ProviderError> {
        dotenvy::dotenv().ok();

        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| ProviderError::Config("SUPABASE_URL not set".to_string()))?;
        let anon_key = std::env::var("SUPABASE_KEY")
            .map_err(|_| ProviderError::Config("SUPABASE_KEY not set".to_string()))?;
        Ok(Self::new(url, anon_key))
    }

    /// Read `SUPABASE_URL` and `SUPABASE_KEY` baked in at compile time.
    #[cfg(target_arch = "wasm32")]
    pub fn from_env() -> Result<Self, ProviderError> {
        let url = option_env!("SUPABASE_URL")
            .ok_or_else(|| ProviderError::Config("SUPABASE_URL not set".to_string()))?;
        let anon_key = option_env!("SUPABASE_KEY")
            .ok_or_else(|| ProviderError::Config("SUPABASE_KEY not set".to_string()))?;
        Ok(Self::new(url, anon_key))
    }

    /// Take the backend location from the `[remote]` section of the config file.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ProviderError> {
        if config.remote.url.is_empty() {
            return Err(ProviderError::Config("remote.url is empty".to_string()));
        }
        Ok(Self::new(&config.remote.url, &config.remote.anon_key))
    }

    /// Environment first, then the config file.
    pub fn resolve(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::from_env().or_else(|_| Self::from_app_config(config))
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path.trim_start_matches('/'))
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    pub fn storage_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.url, bucket, path)
    }

    pub fn public_storage_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.url, bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let config = SupabaseConfig::new("https://demo.supabase.co/", "anon");
        assert_eq!(config.url, "https://demo.supabase.co");
        assert_eq!(config.auth_url("/user"), "https://demo.supabase.co/auth/v1/user");
        assert_eq!(
            config.auth_url("token?grant_type=password"),
            "https://demo.supabase.co/auth/v1/token?grant_type=password"
        );
        assert_eq!(config.rest_url("saved_posts"), "https://demo.supabase.co/rest/v1/saved_posts");
        assert_eq!(
            config.public_storage_url("profile-images", "public/u1/me.png"),
            "https://demo.supabase.co/storage/v1/object/public/profile-images/public/u1/me.png"
        );
    }

    #[test]
    fn test_from_app_config() {
        assert!(SupabaseConfig::from_app_config(&AppConfig::default()).is_err());

        let app = AppConfig::default().with_remote("https://x.supabase.co", "k");
        let config = SupabaseConfig::from_app_config(&app).unwrap();
        assert_eq!(config, SupabaseConfig::new("https://x.supabase.co", "k"));
    }
}
