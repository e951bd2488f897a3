use anchor_core::model::{Condition, Highlight};
use anchor_llm::emit_conditions_tool;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::collaborators::LlmCollaborator;
use crate::config::EngineConfig;
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

/// Calls the LLM with the derive banner and turns the resulting
/// `emit_conditions` tool call into 1-5 top-level [`Condition`]s (spec.md
/// §4.6 DERIVE).
pub async fn derive_conditions(
    llm: &dyn LlmCollaborator,
    config: &EngineConfig,
    claim: &str,
    related_files: &[String],
    seed_highlights: &[Highlight],
) -> Result<Vec<Condition>, EngineError> {
    let messages = json!([
        { "role": "system", "content": "stage: derive. Emit 1-5 falsifiable conditions for this claim." },
        { "role": "user", "content": {
            "claim": claim,
            "related_files": related_files,
            "seed_evidence": { "highlights": &seed_highlights[..seed_highlights.len().min(3)] },
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
    Ok(parsed
        .conditions
        .into_iter()
        .take(5)
        .map(|raw| Condition::new(raw.desc, raw.why, raw.accept, raw.reject, raw.suggested_tasks))
        .collect())
}

pub(crate) fn parse_args<T: for<'de> Deserialize<'de>>(
    tool: &str,
    args: Value,
) -> Result<T, EngineError> {
    serde_json::from_value(args).map_err(|e| EngineError::MalformedToolArgs {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::BoxFuture;

    struct FakeLlm(Value);
    impl LlmCollaborator for FakeLlm {
        fn generate<'a>(
            &'a self,
            _model: &'a str,
            _messages: &'a Value,
            _tools: &'a [Value],
            _tool_choice: Option<&'a str>,
            _effort: Option<&'a str>,
            _service_tier: Option<&'a str>,
        ) -> BoxFuture<'a, Result<(String, Value), EngineError>> {
            let response = self.0.clone();
            Box::pin(async move { Ok(("emit_conditions".to_string(), response)) })
        }
    }

    #[tokio::test]
    async fn derive_conditions_caps_at_five() {
        let conditions: Vec<Value> = (0..8)
            .map(|i| {
                json!({
                    "desc": format!("d{i}"), "why": "w", "accept": "a", "reject": "r",
                    "suggested_tasks": []
                })
            })
            .collect();
        let fake = FakeLlm(json!({ "conditions": conditions }));
        let config = EngineConfig::new("gpt-test");
        let result = derive_conditions(&fake, &config, "claim", &[], &[]).await.unwrap();
        assert_eq!(result.len(), 5);
    }
}
