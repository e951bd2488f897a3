use thiserror::Error;

/// Top-level errors the `anchor` binary can exit non-zero on (spec.md §7).
/// Every variant here maps to a single structured line on the error channel
/// at the call site in `main.rs`; partial finding state is already on disk
/// by the time any of these surface.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Seed(#[from] anchor_seed::SeedError),
    #[error(transparent)]
    Engine(#[from] anchor_engine::EngineError),
    #[error(transparent)]
    Core(#[from] anchor_core::CoreError),
    #[error(transparent)]
    Llm(#[from] anchor_llm::LlmError),
    #[error("invalid --live-format `{0}`, expected `text` or `json`")]
    InvalidLiveFormat(String),
    #[error("git invocation failed: {0}")]
    Git(String),
    #[error("discover task for `{0}` returned an exec observation instead of a discover observation")]
    UnexpectedObservation(String),
}
