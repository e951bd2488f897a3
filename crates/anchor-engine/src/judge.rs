use anchor_core::model::{Condition, ConditionState, ExecObservation};
use anchor_llm::judge_condition_tool;
use serde::Deserialize;
use serde_json::json;

use crate::collaborators::LlmCollaborator;
use crate::config::EngineConfig;
use crate::derive::parse_args;
use crate::error::EngineError;

#[derive(Deserialize)]
struct JudgeConditionArgs {
    state: String,
    rationale: String,
    #[serde(default)]
    evidence_refs: Vec<usize>,
}

/// Judges `condition` from its accumulated evidence (spec.md §4.6 JUDGE).
/// Mutates `condition.state`, `condition.rationale`, and
/// `condition.evidence_refs` in place and returns the resulting state.
pub async fn judge_condition(
    llm: &dyn LlmCollaborator,
    config: &EngineConfig,
    condition: &mut Condition,
) -> Result<ConditionState, EngineError> {
    if condition.evidence.is_empty() {
        condition.rationale = "latest observation not valid JSON".to_string();
        condition.state = ConditionState::Unknown;
        return Ok(ConditionState::Unknown);
    }

    let latest_index = latest_successful_index(&condition.evidence);
    let latest_raw = &condition.evidence[latest_index];
    let Ok(latest): Result<ExecObservation, _> = serde_json::from_str(latest_raw) else {
        condition.rationale = "latest observation not valid JSON".to_string();
        condition.state = ConditionState::Unknown;
        return Ok(ConditionState::Unknown);
    };

    if latest.summary.is_empty() {
        condition.rationale = "missing summary".to_string();
        condition.state = ConditionState::Unknown;
        return Ok(ConditionState::Unknown);
    }
    if !latest.is_error() && latest.citations.is_empty() {
        condition.rationale = "missing citations".to_string();
        condition.state = ConditionState::Unknown;
        return Ok(ConditionState::Unknown);
    }

    let prev_summaries: Vec<String> = condition
        .evidence
        .iter()
        .rev()
        .skip(condition.evidence.len() - latest_index)
        .take(2)
        .filter_map(|raw| serde_json::from_str::<ExecObservation>(raw).ok())
        .map(|obs| obs.summary)
        .collect();

    let messages = json!([
        { "role": "system", "content": "stage: judge. Prefer the latest successful observation; if it conflicts with an earlier success, return failed and explain. If code claims lack usable citations, return unknown and specify the missing citation." },
        { "role": "user", "content": {
            "description": condition.description,
            "accept": condition.accept,
            "reject": condition.reject,
            "summary": latest.summary,
            "citations": latest.citations,
            "prev_summaries": prev_summaries,
        } }
    ]);
    let tools = [judge_condition_tool()];

    let (name, args) = llm
        .generate(
            &config.model,
            &messages,
            &tools,
            Some("judge_condition"),
            config.reasoning_effort.as_deref(),
            config.service_tier.as_deref(),
        )
        .await?;
    if name != "judge_condition" {
        return Err(EngineError::UnexpectedTool(name));
    }
    let parsed: JudgeConditionArgs = parse_args(&name, args)?;

    let state = match parsed.state.as_str() {
        "satisfied" => ConditionState::Satisfied,
        "failed" => ConditionState::Failed,
        _ => ConditionState::Unknown,
    };
    condition.state = state;
    condition.rationale = parsed.rationale;
    condition.evidence_refs = parsed.evidence_refs;
    Ok(state)
}

/// Index of the latest evidence entry with a non-error summary, falling
/// back to the most recent entry if every one is an error.
fn latest_successful_index(evidence: &[String]) -> usize {
    for (rev_index, raw) in evidence.iter().rev().enumerate() {
        if let Ok(obs) = serde_json::from_str::<ExecObservation>(raw) {
            if !obs.is_error() {
                return evidence.len() - 1 - rev_index;
            }
        }
    }
    evidence.len() - 1
}
