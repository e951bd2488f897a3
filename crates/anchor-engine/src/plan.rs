use std::collections::HashSet;

use anchor_core::model::Condition;
use anchor_llm::emit_tasks_tool;
use serde::Deserialize;
use serde_json::json;

use crate::collaborators::LlmCollaborator;
use crate::config::EngineConfig;
use crate::derive::parse_args;
use crate::error::EngineError;

const SYNTHETIC_TASK: &str =
    "callgraph shortest-path from any discovered sink symbol to any public entrypoint";

#[derive(Deserialize)]
struct EmitTasksArgs {
    tasks: Vec<RawTask>,
}

#[derive(Deserialize)]
struct RawTask {
    task: String,
    mode: String,
}

/// Calls `emit_tasks` for `condition` on `path`, then deterministically
/// post-processes the result into up to three `codex:exec:` task strings
/// (spec.md §4.6 PLAN).
pub async fn plan_tasks(
    llm: &dyn LlmCollaborator,
    config: &EngineConfig,
    condition: &Condition,
    path: &str,
) -> Result<Vec<String>, EngineError> {
    let last_summary = condition
        .evidence
        .last()
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
        .and_then(|v| v.get("summary").and_then(|s| s.as_str()).map(str::to_string));
    let must_change_class = last_summary
        .as_deref()
        .map(|s| s.starts_with("error:"))
        .unwrap_or(false);

    let messages = json!([
        { "role": "system", "content": "stage: plan. Emit 1-3 exec tasks, mode=\"exec\", each directly testing accept vs reject." },
        { "role": "user", "content": {
            "path": path,
            "description": condition.description,
            "accept": condition.accept,
            "reject": condition.reject,
            "last_observation_summary": last_summary,
            "must_change_operation_class": must_change_class,
            "verb_hint": ["search", "read-file", "ast-parse", "callgraph", "dataflow"],
        } }
    ]);
    let tools = [emit_tasks_tool()];

    let (name, args) = llm
        .generate(
            &config.model,
            &messages,
            &tools,
            Some("emit_tasks"),
            config.reasoning_effort.as_deref(),
            config.service_tier.as_deref(),
        )
        .await?;
    if name != "emit_tasks" {
        return Err(EngineError::UnexpectedTool(name));
    }
    let parsed: EmitTasksArgs = parse_args(&name, args)?;

    Ok(post_process(parsed, condition, path, config.plan_diversity))
}

fn leading_verb(text: &str) -> String {
    text.split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

fn post_process(
    raw: EmitTasksArgs,
    condition: &Condition,
    path: &str,
    diversity: bool,
) -> Vec<String> {
    let mut seen_dedup = HashSet::new();
    let mut candidates: Vec<String> = Vec::new();
    for task in raw.tasks {
        if task.mode != "exec" || task.task.trim().is_empty() {
            continue;
        }
        let key = (task.mode.clone(), task.task.clone());
        if seen_dedup.insert(key) {
            candidates.push(task.task);
        }
    }

    if diversity {
        candidates.retain(|text| {
            let verb = leading_verb(text);
            if condition.last_verb.as_deref() == Some(verb.as_str()) {
                return false;
            }
            if condition.used_verbs.len() < 3 && condition.used_verbs.iter().any(|v| v == &verb) {
                return false;
            }
            true
        });
    }

    let mut by_verb: Vec<(String, String)> = Vec::new();
    let mut seen_verbs = HashSet::new();
    for text in candidates {
        let verb = leading_verb(&text);
        if seen_verbs.insert(verb.clone()) {
            by_verb.push((verb, text));
        }
    }
    by_verb.truncate(3);

    let has_traversal = by_verb
        .iter()
        .any(|(verb, _)| verb == "callgraph" || verb == "dataflow");
    if !has_traversal {
        if by_verb.len() == 3 {
            by_verb.pop();
        }
        by_verb.push(("callgraph".to_string(), SYNTHETIC_TASK.to_string()));
    }

    by_verb
        .into_iter()
        .map(|(_, text)| format!("codex:exec:{path}::{text}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_tasks(texts: &[&str]) -> EmitTasksArgs {
        EmitTasksArgs {
            tasks: texts
                .iter()
                .map(|t| RawTask {
                    task: t.to_string(),
                    mode: "exec".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn appends_synthetic_traversal_task_when_missing() {
        let condition = Condition::new("d", "w", "a", "r", vec![]);
        let result = post_process(raw_tasks(&["search for sink"]), &condition, "a.py", true);
        assert!(result.iter().any(|t| t.contains("callgraph shortest-path")));
    }

    #[test]
    fn keeps_existing_traversal_task_without_duplicate() {
        let condition = Condition::new("d", "w", "a", "r", vec![]);
        let result = post_process(
            raw_tasks(&["dataflow trace the input", "search for sink"]),
            &condition,
            "a.py",
            true,
        );
        assert_eq!(result.len(), 2);
        assert!(result.iter().any(|t| t.contains("dataflow")));
    }

    #[test]
    fn drops_task_matching_last_verb_under_diversity() {
        let mut condition = Condition::new("d", "w", "a", "r", vec![]);
        condition.record_verb("search");
        let result = post_process(
            raw_tasks(&["search again", "read-file the sink"]),
            &condition,
            "a.py",
            true,
        );
        assert!(!result.iter().any(|t| t.contains("search again")));
    }

    #[test]
    fn caps_to_three_tasks() {
        let condition = Condition::new("d", "w", "a", "r", vec![]);
        let result = post_process(
            raw_tasks(&["search a", "read-file b", "ast-parse c", "dataflow d"]),
            &condition,
            "a.py",
            true,
        );
        assert!(result.len() <= 3);
    }
}
