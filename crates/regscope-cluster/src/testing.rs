use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::{ClusterError, Result};
use crate::runner::CommandRunner;

/// Replays canned stdout per command line and records every call
#[derive(Default)]
pub struct ScriptedRunner {
    outputs: HashMap<String, Vec<u8>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn with(mut self, command: &str, stdout: &str) -> Self {
        self.outputs
            .insert(command.to_string(), stdout.as_bytes().to_vec());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl CommandRunner for &ScriptedRunner {
    async fn run(&self, args: &[String]) -> Result<Vec<u8>> {
        let command = args.join(" ");
        self.calls.lock().push(command.clone());
        self.outputs
            .get(&command)
            .cloned()
            .ok_or_else(|| ClusterError::Command {
                command,
                detail: "exit status: 1".to_string(),
            })
    }
}
