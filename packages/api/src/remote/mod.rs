//! # Remote data store
//!
//! The [`RemoteStore`] trait is the seam between the saved-products
//! synchronizer and the hosted table API. Rows are plain JSON objects; the
//! synchronizer owns the mapping onto its own types.
//!
//! | Implementation | Backing |
//! |----------------|---------|
//! | [`RestStore`] | PostgREST endpoint (`/rest/v1/<table>`) over `reqwest` |
//! | [`MemoryRemote`] | In-process tables for tests and offline runs |
//!
//! Both also implement [`ObjectStorage`], the public file buckets used for
//! profile images.

mod memory;
mod query;
mod rest;

use std::future::Future;

use serde_json::Value;

use crate::error::RemoteError;

pub use memory::MemoryRemote;
pub use query::{Filter, Query};
pub use rest::RestStore;

/// Table-oriented remote storage.
pub trait RemoteStore {
    /// All rows matching `query`, projected onto its columns.
    fn select(&self, query: &Query) -> impl Future<Output = Result<Vec<Value>, RemoteError>>;

    /// The first row matching `query`, if any.
    fn select_single(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Option<Value>, RemoteError>> {
        async move { Ok(self.select(query).await?.into_iter().next()) }
    }

    /// Insert `row`, or merge it into the existing row that collides on the
    /// comma-separated `on_conflict` columns.
    fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &str,
    ) -> impl Future<Output = Result<(), RemoteError>>;

    /// Patch every row matching `query` and return the updated rows.
    fn update(
        &self,
        query: &Query,
        patch: Value,
    ) -> impl Future<Output = Result<Vec<Value>, RemoteError>>;

    /// Delete every row matching `query`.
    fn delete(&self, query: &Query) -> impl Future<Output = Result<(), RemoteError>>;
}

/// Bucketed file storage with public URLs.
pub trait ObjectStorage {
    /// Store `bytes` at `path` in `bucket`, replacing any object already there.
    /// Returns the stored object's path.
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<String, RemoteError>>;

    /// URL under which the object at `path` in `bucket` is publicly readable.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}
