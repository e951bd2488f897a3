use thiserror::Error;

/// Engine-level errors. A terminal [`EngineError::Llm`] aborts the run
/// (spec.md §7); everything else is either degraded locally (task agent
/// failures become error observations, never an `EngineError`) or a
/// genuine defect in tool-call arguments.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Llm(#[from] anchor_llm::LlmError),
    #[error(transparent)]
    Core(#[from] anchor_core::CoreError),
    #[error("llm tool `{tool}` returned malformed arguments: {reason}")]
    MalformedToolArgs { tool: String, reason: String },
    #[error("llm returned unexpected tool `{0}`")]
    UnexpectedTool(String),
    #[error(transparent)]
    Agent(#[from] anchor_agent::AgentError),
}
