use std::future::Future;
use std::pin::Pin;

use anchor_agent::{AgentObservation, TaskAgent};
use anchor_llm::LlmClient;
use serde_json::Value;

use crate::error::EngineError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Abstracts the LLM call the engine depends on, so `Pipeline` can be
/// driven against a fake in tests without a network call (SPEC_FULL.md
/// §5.6). Hand-rolled rather than via a proc-macro crate, following the
/// pack's preference for boxed futures over adding a new dependency for
/// this alone.
pub trait LlmCollaborator: Send + Sync {
    fn generate<'a>(
        &'a self,
        model: &'a str,
        messages: &'a Value,
        tools: &'a [Value],
        tool_choice: Option<&'a str>,
        effort: Option<&'a str>,
        service_tier: Option<&'a str>,
    ) -> BoxFuture<'a, Result<(String, Value), EngineError>>;
}

impl LlmCollaborator for LlmClient {
    fn generate<'a>(
        &'a self,
        model: &'a str,
        messages: &'a Value,
        tools: &'a [Value],
        tool_choice: Option<&'a str>,
        effort: Option<&'a str>,
        service_tier: Option<&'a str>,
    ) -> BoxFuture<'a, Result<(String, Value), EngineError>> {
        Box::pin(async move {
            self.generate(model, messages, tools, tool_choice, effort, service_tier)
                .await
                .map_err(EngineError::from)
        })
    }
}

/// Abstracts running one task-agent task. Same rationale as
/// [`LlmCollaborator`].
pub trait TaskCollaborator: Send + Sync {
    fn run_task<'a>(
        &'a self,
        task_str: &'a str,
        repo_content_hash: &'a str,
    ) -> BoxFuture<'a, Result<AgentObservation, EngineError>>;
}

impl TaskCollaborator for TaskAgent {
    fn run_task<'a>(
        &'a self,
        task_str: &'a str,
        repo_content_hash: &'a str,
    ) -> BoxFuture<'a, Result<AgentObservation, EngineError>> {
        Box::pin(async move {
            self.run_task(task_str, repo_content_hash)
                .await
                .map_err(EngineError::from)
        })
    }
}
