//! In-process tables implementing [`RemoteStore`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;

use super::{ObjectStorage, Query, RemoteStore};
use crate::error::RemoteError;

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, Vec<Value>>,
    /// Uploaded files keyed by `bucket/path`
    objects: HashMap<String, Vec<u8>>,
    fail_reads: bool,
    fail_writes: bool,
    delay: Option<Duration>,
}

/// Remote store kept in memory. Clones share the same tables.
#[derive(Clone, Debug, Default)]
pub struct MemoryRemote {
    inner: Arc<Mutex<Inner>>,
    calls: Arc<AtomicUsize>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of every row in `table`.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// Content of an uploaded object.
    pub fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.lock().objects.get(&format!("{bucket}/{path}")).cloned()
    }

    pub fn insert_row(&self, table: &str, row: Value) {
        self.lock()
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Hold every call for `delay` before answering.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.lock().delay = delay;
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, write: bool) -> Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (failing, delay) = {
            let inner = self.lock();
            let failing = if write { inner.fail_writes } else { inner.fail_reads };
            (failing, inner.delay)
        };
        if let Some(delay) = delay {
            sleep(delay).await;
        }
        if failing {
            return Err(RemoteError::Transport("remote unreachable".to_string()));
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep(delay: Duration) {
    tokio::time::sleep(delay).await;
}

#[cfg(target_arch = "wasm32")]
async fn sleep(delay: Duration) {
    gloo_timers::future::sleep(delay).await;
}

fn collides(existing: &Value, row: &Value, keys: &[&str]) -> bool {
    keys.iter()
        .all(|key| existing.get(key).is_some() && existing.get(key) == row.get(key))
}

impl RemoteStore for MemoryRemote {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, RemoteError> {
        self.enter(false).await?;
        let inner = self.lock();
        Ok(inner
            .tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.matches(row))
                    .map(|row| query.project(row))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn upsert(&self, table: &str, row: Value, on_conflict: &str) -> Result<(), RemoteError> {
        self.enter(true).await?;
        let keys: Vec<&str> = on_conflict.split(',').map(str::trim).collect();
        let mut inner = self.lock();
        let rows = inner.tables.entry(table.to_string()).or_default();
        match rows.iter_mut().find(|existing| collides(existing, &row, &keys)) {
            Some(existing) => {
                if let (Some(target), Some(patch)) = (existing.as_object_mut(), row.as_object()) {
                    target.extend(patch.clone());
                }
            }
            None => rows.push(row),
        }
        Ok(())
    }

    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, RemoteError> {
        self.enter(true).await?;
        let mut inner = self.lock();
        let Some(rows) = inner.tables.get_mut(&query.table) else {
            return Ok(Vec::new());
        };
        let mut updated = Vec::new();
        for row in rows.iter_mut().filter(|row| query.matches(row)) {
            if let (Some(target), Some(patch)) = (row.as_object_mut(), patch.as_object()) {
                target.extend(patch.clone());
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, query: &Query) -> Result<(), RemoteError> {
        self.enter(true).await?;
        if let Some(rows) = self.lock().tables.get_mut(&query.table) {
            rows.retain(|row| !query.matches(row));
        }
        Ok(())
    }
}

impl ObjectStorage for MemoryRemote {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, RemoteError> {
        self.enter(true).await?;
        self.lock().objects.insert(format!("{bucket}/{path}"), bytes);
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://{bucket}/{path}")
    }
}
