use std::path::PathBuf;

use thiserror::Error;

/// Failures talking to the cluster or the snapshot cache
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The inventory command could not be started or exited non-zero
    #[error("`{command}` failed: {detail}")]
    Command { command: String, detail: String },

    /// Live or cached output is not the expected JSON
    #[error("invalid JSON for {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    /// Snapshot could not be read or written
    #[error("cache I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Registry service exists but does not expose an address
    #[error("service {namespace}/{name} has no cluster IP or port")]
    MissingAddress { namespace: String, name: String },
}

pub type Result<T> = std::result::Result<T, ClusterError>;
