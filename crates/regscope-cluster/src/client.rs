//! Inventory client for regscope

use serde::de::DeserializeOwned;
use tracing::debug;

use regscope_types::{Image, ImageStream, Project, ResourceKind};

use crate::cache::{CacheKey, SnapshotCache, get_or_fetch};
use crate::error::{ClusterError, Result};
use crate::runner::CommandRunner;

/// Cluster client wrapper
///
/// Owns the command runner and the snapshot cache so every query goes through
/// one explicit object instead of an ambient session.
pub struct ClusterClient<R> {
    runner: R,
    cache: Box<dyn SnapshotCache>,
    refresh: bool,
}

impl<R: CommandRunner> ClusterClient<R> {
    /// Create a client that reuses snapshots from `cache`
    pub fn new(runner: R, cache: Box<dyn SnapshotCache>) -> Self {
        Self {
            runner,
            cache,
            refresh: false,
        }
    }

    /// Bypass stored snapshots for list queries (they are still rewritten)
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn refresh(&self) -> bool {
        self.refresh
    }

    /// List every resource of `kind`, scoped to `namespace` or cluster-wide
    pub async fn list_resources<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
    ) -> Result<Vec<T>> {
        let key = CacheKey::new(kind, namespace);
        let args = list_args(kind, namespace);
        get_or_fetch(self.cache.as_ref(), &key, self.refresh, || {
            self.runner.run(&args)
        })
        .await
    }

    /// Fetch a single named resource; never cached
    pub async fn get_resource<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        name: &str,
        namespace: &str,
    ) -> Result<T> {
        let args = to_args(&["-n", namespace, "get", kind.as_str(), name, "-o", "json"]);
        let raw = self.runner.run(&args).await?;
        serde_json::from_slice(&raw).map_err(|source| ClusterError::Parse {
            what: format!("{} {}/{}", kind, namespace, name),
            source,
        })
    }

    /// Current context of the logged-in session (`oc whoami -c`)
    pub async fn current_identity(&self) -> Result<String> {
        let raw = self.runner.run(&to_args(&["whoami", "-c"])).await?;
        let identity = String::from_utf8_lossy(&raw).trim().to_string();
        debug!(%identity, "resolved current identity");
        Ok(identity)
    }

    /// All projects visible to the session
    pub async fn projects(&self) -> Result<Vec<Project>> {
        self.list_resources(ResourceKind::Projects, None).await
    }

    /// Image streams of one project
    pub async fn image_streams(&self, project: &str) -> Result<Vec<ImageStream>> {
        self.list_resources(ResourceKind::ImageStreams, Some(project))
            .await
    }

    /// Every image in the cluster (images are not namespaced)
    pub async fn images(&self) -> Result<Vec<Image>> {
        self.list_resources(ResourceKind::Images, None).await
    }
}

fn list_args(kind: ResourceKind, namespace: Option<&str>) -> Vec<String> {
    let mut args = Vec::with_capacity(6);
    if let Some(ns) = namespace {
        args.extend(to_args(&["-n", ns]));
    }
    args.extend(to_args(&["get", kind.as_str(), "-o", "json"]));
    args
}

fn to_args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
