use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The structured outcome of one Codex invocation, per spec.md §4.2 step 6.
/// Serializable so the response cache can store it as a JSON blob on disk.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    pub returncode: i32,
    pub duration: Duration,
    pub cmd: Vec<String>,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.returncode == 0
    }
}
