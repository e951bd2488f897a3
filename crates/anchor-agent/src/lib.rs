#![forbid(unsafe_code)]

//! The task agent: parses the fixed task-string grammar the engine emits,
//! builds stage-banner-prefixed Codex prompts, and validates the JSON that
//! comes back. No other crate constructs a Codex prompt.

mod agent;
mod error;
mod grammar;
mod prompts;
mod schema;

pub use agent::{AgentObservation, TaskAgent};
pub use error::AgentError;
pub use grammar::{Lens, Task};
pub use prompts::{discover_prompt, exec_prompt, system_banner, Stage};
pub use schema::{validate_discover, validate_exec};
