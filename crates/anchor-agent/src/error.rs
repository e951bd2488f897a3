use thiserror::Error;

/// Errors raised while parsing a task string or validating a Codex
/// response. Dispatcher-level failures (timeout, non-zero exit) are not
/// represented here — the agent maps those to a degraded-but-valid
/// `exec_observation` rather than propagating an error (spec.md §4.3 step 5).
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("malformed task string: {0}")]
    MalformedTask(String),
    #[error(transparent)]
    Path(#[from] anchor_core::CoreError),
    #[error("codex response was not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("codex response failed schema validation: {0}")]
    InvalidObservation(String),
    #[error(transparent)]
    Dispatch(#[from] anchor_dispatch::DispatchError),
}
