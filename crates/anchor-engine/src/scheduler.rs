use std::path::Path;
use std::sync::Arc;

use anchor_core::model::{Condition, ConditionState, TasksLogEntry};

use crate::collaborators::{BoxFuture, LlmCollaborator, TaskCollaborator};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::exec::{apply_batch, run_batch};
use crate::judge::judge_condition;
use crate::narrow::narrow_condition;
use crate::plan::plan_tasks;
use crate::scoring::score_condition;

/// Runs one PLAN -> EXEC -> JUDGE cycle on `condition`, narrowing and
/// recursing into sub-conditions while `steps_remaining` allows (spec.md
/// §4.6). Boxed because the recursive call into narrowed sub-conditions
/// would otherwise produce an infinitely-sized future.
pub fn resolve_condition<'a>(
    llm: &'a dyn LlmCollaborator,
    agent: Arc<dyn TaskCollaborator>,
    config: &'a EngineConfig,
    condition: &'a mut Condition,
    path: &'a str,
    repo_root: &'a Path,
    repo_content_hash: &'a str,
    tasks_log: &'a mut Vec<TasksLogEntry>,
    steps_remaining: u32,
) -> BoxFuture<'a, Result<(), EngineError>> {
    Box::pin(async move {
        if steps_remaining == 0 {
            return Ok(());
        }

        let tasks = plan_tasks(llm, config, condition, path).await?;
        if !tasks.is_empty() {
            let batch = run_batch(
                Arc::clone(&agent),
                tasks,
                repo_content_hash,
                config.workers,
            )
            .await?;
            apply_batch(condition, tasks_log, &batch);
        }

        judge_condition(llm, config, condition).await?;
        condition.step_index += 1;

        if condition.state == ConditionState::Unknown && steps_remaining > 1 {
            narrow_condition(llm, config, condition).await?;
            for child in condition.subconditions.iter_mut() {
                resolve_condition(
                    llm,
                    Arc::clone(&agent),
                    config,
                    child,
                    path,
                    repo_root,
                    repo_content_hash,
                    tasks_log,
                    steps_remaining - 1,
                )
                .await?;
            }
            condition.aggregate_from_subconditions();
        }

        Ok(())
    })
}

/// Mandatory breadth pass: every top-level condition gets exactly one
/// resolve cycle (`steps_remaining = 1`, so NARROW never triggers here —
/// spec.md §4.6 "Two-phase breadth/depth scheduler").
pub async fn breadth_pass(
    llm: &dyn LlmCollaborator,
    agent: Arc<dyn TaskCollaborator>,
    config: &EngineConfig,
    conditions: &mut [Condition],
    path: &str,
    repo_root: &Path,
    repo_content_hash: &str,
    tasks_log: &mut Vec<TasksLogEntry>,
) -> Result<(), EngineError> {
    for condition in conditions.iter_mut() {
        resolve_condition(
            llm,
            Arc::clone(&agent),
            config,
            condition,
            path,
            repo_root,
            repo_content_hash,
            tasks_log,
            1,
        )
        .await?;
    }
    Ok(())
}

/// Depth pass: still-`unknown` top-level conditions are ranked by
/// [`score_condition`] descending (ties broken by input order) and the top
/// `bfs_budget` are each run up to `max_steps` more resolve cycles.
pub async fn depth_pass(
    llm: &dyn LlmCollaborator,
    agent: Arc<dyn TaskCollaborator>,
    config: &EngineConfig,
    conditions: &mut [Condition],
    path: &str,
    repo_root: &Path,
    repo_content_hash: &str,
    tasks_log: &mut Vec<TasksLogEntry>,
) -> Result<(), EngineError> {
    let mut ranked: Vec<(i32, usize)> = conditions
        .iter()
        .enumerate()
        .filter(|(_, c)| c.state == ConditionState::Unknown)
        .map(|(index, c)| (score_condition(c, repo_root), index))
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    ranked.truncate(config.bfs_budget);

    for (_, index) in ranked {
        resolve_condition(
            llm,
            Arc::clone(&agent),
            config,
            &mut conditions[index],
            path,
            repo_root,
            repo_content_hash,
            tasks_log,
            config.max_steps,
        )
        .await?;
    }
    Ok(())
}
