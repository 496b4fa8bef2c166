//! OpenShift inventory client for regscope
//!
//! This crate runs the `oc` command line tool, keeps verbatim snapshots of its
//! JSON output in a pluggable cache, and deserializes the listed records.

mod cache;
mod client;
mod error;
mod registry;
mod runner;
#[cfg(test)]
mod testing;

pub use cache::{CacheKey, DiskCache, MemoryCache, NoCache, SnapshotCache, get_or_fetch};
pub use client::ClusterClient;
pub use error::{ClusterError, Result};
pub use registry::{
    DEFAULT_REGISTRY, REGISTRY_NAMESPACE, REGISTRY_SERVICE, discover_registry, resolve_registry,
};
pub use runner::{CommandRunner, OcCommand};

// Re-export types used in our public API
pub use regscope_types::{Image, ImageStream, Project, ResourceKind, Service};
