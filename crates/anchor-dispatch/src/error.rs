use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while invoking the Codex CLI. Timeouts and non-zero exits
/// are recoverable at the task-agent layer (spec.md §7); everything else is
/// a dispatcher-level defect.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("codex binary `{binary}` could not be spawned: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to wait for codex process: {source}")]
    Wait {
        #[source]
        source: std::io::Error,
    },
    #[error("codex exceeded timeout of {timeout:?}")]
    Timeout { timeout: Duration },
    #[error("codex exited with status {status}: {stderr}")]
    NonZeroExit { status: i32, stderr: String },
    #[error("failed to capture codex output: {0}")]
    CaptureIo(#[from] std::io::Error),
    #[error("failed to write prompt to codex stdin: {0}")]
    StdinWrite(#[source] std::io::Error),
    #[error("codex stdin unavailable")]
    StdinUnavailable,
    #[error("codex stdout unavailable")]
    StdoutUnavailable,
    #[error("codex stderr unavailable")]
    StderrUnavailable,
    #[error("failed to join codex output task: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("failed to create temp file for codex last-message output: {0}")]
    TempFile(#[source] std::io::Error),
    #[error(transparent)]
    Core(#[from] anchor_core::CoreError),
}
