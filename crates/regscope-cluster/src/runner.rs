use std::future::Future;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{ClusterError, Result};

/// Runs the inventory command with the given arguments and returns its stdout
pub trait CommandRunner {
    fn run(&self, args: &[String]) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// The `oc` command line tool, using whatever session it is logged into
#[derive(Clone, Debug)]
pub struct OcCommand {
    binary: PathBuf,
}

impl OcCommand {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Printable command line for logs and errors
    pub fn command_line(&self, args: &[String]) -> String {
        let mut line = self.binary.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl Default for OcCommand {
    fn default() -> Self {
        Self::new("oc")
    }
}

impl CommandRunner for OcCommand {
    async fn run(&self, args: &[String]) -> Result<Vec<u8>> {
        let command = self.command_line(args);
        debug!(%command, "running inventory command");

        let output = tokio::process::Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| ClusterError::Command {
                command: command.clone(),
                detail: format!("could not start: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClusterError::Command {
                command,
                detail: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        debug!(%command, bytes = output.stdout.len(), "inventory command finished");
        Ok(output.stdout)
    }
}
