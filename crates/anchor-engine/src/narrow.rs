use anchor_core::model::Condition;
use anchor_llm::emit_conditions_tool;
use serde::Deserialize;
use serde_json::json;

use crate::collaborators::LlmCollaborator;
use crate::config::EngineConfig;
use crate::derive::parse_args;
use crate::error::EngineError;

#[derive(Deserialize)]
struct EmitConditionsArgs {
    conditions: Vec<RawCondition>,
}

#[derive(Deserialize)]
struct RawCondition {
    desc: String,
    why: String,
    accept: String,
    reject: String,
    #[serde(default)]
    suggested_tasks: Vec<String>,
}

/// Narrows `condition` into 1-3 sub-conditions targeting the part of
/// ACCEPT/REJECT that JUDGE left unresolved, and appends them as children
/// (spec.md §4.6 NARROW). Only called when JUDGE returned `unknown` and the
/// step budget is not exhausted; the caller drives recursion into the new
/// children.
pub async fn narrow_condition(
    llm: &dyn LlmCollaborator,
    config: &EngineConfig,
    condition: &mut Condition,
) -> Result<(), EngineError> {
    let last_evidence = condition.evidence.last().cloned();

    let messages = json!([
        { "role": "system", "content": "stage: narrow. Emit 1-3 mutually informative sub-conditions, each targeting an unmet part of accept/reject." },
        { "role": "user", "content": {
            "parent_condition": condition.description,
            "parent_accept": condition.accept,
            "parent_reject": condition.reject,
            "blocking_uncertainty": condition.rationale,
            "last_evidence": last_evidence,
        } }
    ]);
    let tools = [emit_conditions_tool()];

    let (name, args) = llm
        .generate(
            &config.model,
            &messages,
            &tools,
            Some("emit_conditions"),
            config.reasoning_effort.as_deref(),
            config.service_tier.as_deref(),
        )
        .await?;
    if name != "emit_conditions" {
        return Err(EngineError::UnexpectedTool(name));
    }
    let parsed: EmitConditionsArgs = parse_args(&name, args)?;

    let children = parsed
        .conditions
        .into_iter()
        .take(3)
        .map(|raw| Condition::new(raw.desc, raw.why, raw.accept, raw.reject, raw.suggested_tasks));
    condition.subconditions.extend(children);
    Ok(())
}
