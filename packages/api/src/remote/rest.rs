//! PostgREST client for the hosted tables.

use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use super::{ObjectStorage, Query, RemoteStore};
use crate::auth::{AccessToken, SupabaseConfig};
use crate::error::RemoteError;

/// Remote store speaking the PostgREST dialect.
///
/// Requests carry the anon key and, once signed in, the session's bearer token
/// from the shared [`AccessToken`] cell so row-level security applies.
#[derive(Clone)]
pub struct RestStore {
    http: Client,
    config: SupabaseConfig,
    token: AccessToken,
}

impl RestStore {
    pub fn new(config: SupabaseConfig, token: AccessToken) -> Self {
        Self {
            http: Client::new(),
            config,
            token,
        }
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .token
            .get()
            .unwrap_or_else(|| self.config.anon_key.clone());
        builder
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
    }

    async fn check(response: Response) -> Result<Response, RemoteError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        Err(RemoteError::Status { status, message })
    }
}

impl RemoteStore for RestStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, RemoteError> {
        let response = self
            .request(self.http.get(self.config.rest_url(&query.table)))
            .query(&query.to_params(true))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<(), RemoteError> {
        let response = self
            .request(self.http.post(self.config.rest_url(table)))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&row)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, RemoteError> {
        let response = self
            .request(self.http.patch(self.config.rest_url(&query.table)))
            .query(&query.to_params(false))
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete(&self, query: &Query) -> Result<(), RemoteError> {
        let response = self
            .request(self.http.delete(self.config.rest_url(&query.table)))
            .query(&query.to_params(false))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

impl ObjectStorage for RestStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, RemoteError> {
        let response = self
            .request(self.http.post(self.config.storage_url(bucket, path)))
            .header("Content-Type", content_type)
            .header("Cache-Control", "max-age=3600")
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.config.public_storage_url(bucket, path)
    }
}
