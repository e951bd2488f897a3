use std::sync::Arc;

use anchor_agent::AgentObservation;
use anchor_core::model::{Condition, TasksLogEntry};
use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;

use crate::collaborators::TaskCollaborator;
use crate::error::EngineError;

/// One task's outcome, tagged with its content-addressed `input_sha1` so
/// the batch can be reordered deterministically regardless of completion
/// timing (spec.md §4.6 EXEC, §5).
pub struct TaskResult {
    pub input_sha1: String,
    pub task_str: String,
    pub observation_json: String,
    pub verb: String,
}

fn input_sha1(task_str: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(task_str.as_bytes());
    hex::encode(hasher.finalize())
}

fn leading_verb(task_str: &str) -> String {
    task_str
        .rsplit_once("::")
        .map(|(_, goal)| goal)
        .unwrap_or(task_str)
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Runs `task_strs` against `agent` with up to `workers` tasks in flight at
/// once, then returns results sorted by `input_sha1` (spec.md §4.6 EXEC,
/// §5 "Ordering guarantees").
pub async fn run_batch(
    agent: Arc<dyn TaskCollaborator>,
    task_strs: Vec<String>,
    repo_content_hash: &str,
    workers: usize,
) -> Result<Vec<TaskResult>, EngineError> {
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut handles = Vec::new();

    for task_str in task_strs {
        let permit_source = Arc::clone(&semaphore);
        let agent = Arc::clone(&agent);
        let repo_content_hash = repo_content_hash.to_string();
        handles.push(tokio::spawn(async move {
            let _permit = permit_source
                .acquire_owned()
                .await
                .expect("semaphore is never closed");
            let verb = leading_verb(&task_str);
            let sha1 = input_sha1(&task_str);
            let observation = agent.run_task(&task_str, &repo_content_hash).await;
            (sha1, task_str, verb, observation)
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        let (sha1, task_str, verb, observation) =
            handle.await.expect("task-exec worker does not panic");
        let observation_json = match observation? {
            AgentObservation::Exec(obs) => serde_json::to_string(&obs)
                .expect("ExecObservation serialization is infallible"),
            AgentObservation::Discover(obs) => serde_json::to_string(&obs)
                .expect("DiscoverObservation serialization is infallible"),
        };
        results.push(TaskResult {
            input_sha1: sha1,
            task_str,
            observation_json,
            verb,
        });
    }

    results.sort_by(|a, b| a.input_sha1.cmp(&b.input_sha1));
    Ok(results)
}

/// Appends a completed batch's observations to `condition.evidence`, logs
/// the batch to `tasks_log`, and updates verb-diversity bookkeeping, all in
/// the deterministic `input_sha1` order the batch already carries (spec.md
/// §4.6 EXEC step "Update `used_verbs` and `last_verb`").
pub fn apply_batch(condition: &mut Condition, tasks_log: &mut Vec<TasksLogEntry>, batch: &[TaskResult]) {
    let executed: Vec<String> = batch.iter().map(|r| r.task_str.clone()).collect();
    for result in batch {
        condition.evidence.push(result.observation_json.clone());
        condition.record_verb(&result.verb);
    }
    tasks_log.push(TasksLogEntry {
        condition: condition.description.clone(),
        executed,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::BoxFuture;

    struct FakeAgent;
    impl TaskCollaborator for FakeAgent {
        fn run_task<'a>(
            &'a self,
            task_str: &'a str,
            _repo_content_hash: &'a str,
        ) -> BoxFuture<'a, Result<AgentObservation, EngineError>> {
            let obs = anchor_core::model::ExecObservation::new(format!("ran {task_str}"), vec![]);
            Box::pin(async move { Ok(AgentObservation::Exec(obs)) })
        }
    }

    #[tokio::test]
    async fn run_batch_is_sorted_by_input_sha1() {
        let agent: Arc<dyn TaskCollaborator> = Arc::new(FakeAgent);
        let tasks = vec![
            "codex:exec:a.py::search a".to_string(),
            "codex:exec:a.py::read-file b".to_string(),
        ];
        let results = run_batch(agent, tasks, "repohash", 2).await.unwrap();
        let mut expected: Vec<String> = results.iter().map(|r| r.input_sha1.clone()).collect();
        expected.sort();
        let actual: Vec<String> = results.iter().map(|r| r.input_sha1.clone()).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn apply_batch_updates_evidence_and_verbs() {
        let mut condition = Condition::new("d", "w", "a", "r", vec![]);
        let mut tasks_log = Vec::new();
        let batch = vec![TaskResult {
            input_sha1: "x".into(),
            task_str: "codex:exec:a.py::search the sink".into(),
            observation_json: "{}".into(),
            verb: "search".into(),
        }];
        apply_batch(&mut condition, &mut tasks_log, &batch);
        assert_eq!(condition.evidence.len(), 1);
        assert_eq!(condition.last_verb.as_deref(), Some("search"));
        assert_eq!(tasks_log.len(), 1);
    }
}
