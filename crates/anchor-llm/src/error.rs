use thiserror::Error;

/// Errors raised by the reasoning-service client. A terminal `LlmError`
/// after exhausting the retry envelope aborts the run (spec.md §7); the
/// caller is responsible for that escalation, this type just reports it.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("failed to build request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("llm endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("llm response was not valid JSON: {0}")]
    InvalidJson(serde_json::Error),
    #[error("no tool call found in llm response")]
    NoToolCall,
    #[error(transparent)]
    Memo(#[from] anchor_core::CoreError),
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
}
