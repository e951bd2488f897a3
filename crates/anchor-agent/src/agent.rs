use std::path::{Path, PathBuf};

use anchor_core::model::{DiscoverObservation, ExecObservation};
use anchor_core::paths::repo_rel;
use anchor_dispatch::{CodexDispatcher, DispatchError};
use tracing::warn;

use crate::error::AgentError;
use crate::grammar::Task;
use crate::prompts::{discover_prompt, exec_prompt};
use crate::schema::{validate_discover, validate_exec};

/// Either shape of validated Codex response a task can resolve to.
#[derive(Clone, Debug, PartialEq)]
pub enum AgentObservation {
    Discover(DiscoverObservation),
    Exec(ExecObservation),
}

/// Mints Codex prompts and validates their responses. This is the only
/// place in the workspace that constructs a Codex prompt — the engine only
/// ever hands the agent a task string (spec.md §4.3).
pub struct TaskAgent {
    dispatcher: CodexDispatcher,
    repo_root: PathBuf,
}

impl TaskAgent {
    pub fn new(dispatcher: CodexDispatcher, repo_root: impl Into<PathBuf>) -> Self {
        Self {
            dispatcher,
            repo_root: repo_root.into(),
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Runs `task_str` against the dispatcher and returns a validated
    /// observation. `repo_content_hash` is forwarded unchanged into the
    /// dispatcher's response-cache key.
    pub async fn run_task(
        &self,
        task_str: &str,
        repo_content_hash: &str,
    ) -> Result<AgentObservation, AgentError> {
        let task: Task = task_str.parse()?;

        match task {
            Task::Discover { path, lens } => {
                repo_rel(&self.repo_root, Path::new(&path))?;
                let prompt = discover_prompt(&path, lens);
                match self
                    .dispatcher
                    .exec(&prompt, &self.repo_root, repo_content_hash)
                    .await
                {
                    Ok(result) => Ok(AgentObservation::Discover(validate_discover(&result.stdout)?)),
                    Err(err) => Err(AgentError::Dispatch(err)),
                }
            }
            Task::Exec { path, goal } => {
                repo_rel(&self.repo_root, Path::new(&path))?;
                let prompt = exec_prompt(&path, &goal);
                match self
                    .dispatcher
                    .exec(&prompt, &self.repo_root, repo_content_hash)
                    .await
                {
                    Ok(result) => Ok(AgentObservation::Exec(validate_exec(&result.stdout)?)),
                    Err(DispatchError::Timeout { .. }) => {
                        warn!(task = task_str, "codex exec timed out, degrading to error observation");
                        Ok(AgentObservation::Exec(ExecObservation::error("timeout")))
                    }
                    Err(DispatchError::NonZeroExit { status, .. }) => {
                        warn!(
                            task = task_str,
                            status, "codex exec exited non-zero, degrading to error observation"
                        );
                        Ok(AgentObservation::Exec(ExecObservation::error(format!(
                            "codex-exit {status}"
                        ))))
                    }
                    Err(other) => Err(AgentError::Dispatch(other)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn dispatcher_for_missing_binary() -> CodexDispatcher {
        CodexDispatcher::builder()
            .binary("/nonexistent/definitely-not-codex")
            .retries(0)
            .timeout(Duration::from_millis(50))
            .cache_dir(tempfile::tempdir().unwrap().into_path())
            .build()
    }

    #[tokio::test]
    async fn exec_task_against_missing_binary_degrades_to_spawn_error() {
        let repo = tempfile::tempdir().unwrap();
        std::fs::write(repo.path().join("a.py"), b"x = 1").unwrap();
        let agent = TaskAgent::new(dispatcher_for_missing_binary(), repo.path());
        let result = agent
            .run_task("codex:exec:a.py::confirm the sink", "repohash")
            .await;
        assert!(matches!(result, Err(AgentError::Dispatch(DispatchError::Spawn { .. }))));
    }

    #[tokio::test]
    async fn path_outside_repo_is_rejected_before_dispatch() {
        let repo = tempfile::tempdir().unwrap();
        let agent = TaskAgent::new(dispatcher_for_missing_binary(), repo.path());
        let result = agent
            .run_task("codex:discover:../outside.py", "repohash")
            .await;
        assert!(matches!(result, Err(AgentError::Path(_))));
    }
}
