//! Snapshot cache for inventory command output
//!
//! Snapshots are the verbatim JSON printed by `oc get <kind> -o json`, keyed by
//! (namespace, resource kind). Repeated runs reuse them until a refresh is
//! requested.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use regscope_types::ResourceKind;

use crate::error::{ClusterError, Result};

/// Composite cache key
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Namespace the query was scoped to (None = cluster-wide)
    pub namespace: Option<String>,
    pub kind: ResourceKind,
}

impl CacheKey {
    pub fn new(kind: ResourceKind, namespace: Option<&str>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            kind,
        }
    }

    /// File name used by [`DiskCache`], e.g. `shop-imagestreams.json`
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.json",
            self.namespace.as_deref().unwrap_or("None"),
            self.kind
        )
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{} in {}", self.kind, ns),
            None => write!(f, "{} (cluster-wide)", self.kind),
        }
    }
}

/// Key-value store for raw snapshots
pub trait SnapshotCache: Send + Sync {
    /// Stored snapshot, or None on a miss
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>>;

    /// Store (or replace) a snapshot
    fn put(&self, key: &CacheKey, raw: &[u8]) -> Result<()>;
}

impl<T: SnapshotCache + ?Sized> SnapshotCache for Arc<T> {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &CacheKey, raw: &[u8]) -> Result<()> {
        (**self).put(key, raw)
    }
}

/// One JSON file per key inside a directory
#[derive(Clone, Debug)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic location of the snapshot for a key
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl SnapshotCache for DiskCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ClusterError::Io { path, source }),
        }
    }

    fn put(&self, key: &CacheKey, raw: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| ClusterError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(key);
        fs::write(&path, raw).map_err(|source| ClusterError::Io { path, source })
    }
}

/// In-process snapshots, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<CacheKey, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl SnapshotCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &CacheKey, raw: &[u8]) -> Result<()> {
        self.entries.write().insert(key.clone(), raw.to_vec());
        Ok(())
    }
}

/// Never hits, discards writes
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCache;

impl SnapshotCache for NoCache {
    fn get(&self, _key: &CacheKey) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn put(&self, _key: &CacheKey, _raw: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// Top-level shape of `oc get <kind> -o json`
#[derive(Deserialize)]
struct ItemList<T> {
    items: Vec<T>,
}

/// Return the cached snapshot for `key`, or run `fetch`, store its raw output
/// and return that. `refresh` skips the lookup but still stores the result.
pub async fn get_or_fetch<T, F, Fut>(
    cache: &dyn SnapshotCache,
    key: &CacheKey,
    refresh: bool,
    fetch: F,
) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<u8>>>,
{
    let cached = if refresh { None } else { cache.get(key)? };

    let raw = match cached {
        Some(raw) => {
            debug!(%key, bytes = raw.len(), "snapshot cache hit");
            raw
        }
        None => {
            debug!(%key, refresh, "snapshot cache miss, fetching");
            let raw = fetch().await?;
            cache.put(key, &raw)?;
            raw
        }
    };

    let list: ItemList<T> = serde_json::from_slice(&raw).map_err(|source| ClusterError::Parse {
        what: key.to_string(),
        source,
    })?;
    Ok(list.items)
}
