use serde_json::{json, Value};

/// The `emit_conditions` tool: 1-5 objects `{desc, why, accept, reject,
/// suggested_tasks[]}` used by both DERIVE and NARROW (spec.md §4.6, §6).
pub fn emit_conditions_tool() -> Value {
    json!({
        "type": "function",
        "name": "emit_conditions",
        "description": "Emit 1-5 conditions that must hold for the claim to be a true positive.",
        "parameters": {
            "type": "object",
            "properties": {
                "schema_version": { "type": "integer" },
                "stage": { "type": "string" },
                "conditions": {
                    "type": "array",
                    "minItems": 1,
                    "maxItems": 5,
                    "items": {
                        "type": "object",
                        "properties": {
                            "desc": { "type": "string" },
                            "why": { "type": "string" },
                            "accept": { "type": "string" },
                            "reject": { "type": "string" },
                            "suggested_tasks": {
                                "type": "array",
                                "items": { "type": "string" }
                            }
                        },
                        "required": ["desc", "why", "accept", "reject", "suggested_tasks"]
                    }
                }
            },
            "required": ["schema_version", "stage", "conditions"]
        }
    })
}

/// The `emit_tasks` tool: 1-3 objects `{task, why, mode="exec"}` (spec.md §4.6).
pub fn emit_tasks_tool() -> Value {
    json!({
        "type": "function",
        "name": "emit_tasks",
        "description": "Emit 1-3 exec tasks that directly test a condition's accept/reject contract.",
        "parameters": {
            "type": "object",
            "properties": {
                "schema_version": { "type": "integer" },
                "stage": { "type": "string" },
                "tasks": {
                    "type": "array",
                    "minItems": 1,
                    "maxItems": 3,
                    "items": {
                        "type": "object",
                        "properties": {
                            "task": { "type": "string" },
                            "why": { "type": "string" },
                            "mode": { "type": "string", "enum": ["exec"] }
                        },
                        "required": ["task", "why", "mode"]
                    }
                }
            },
            "required": ["schema_version", "stage", "tasks"]
        }
    })
}

/// The `judge_condition` tool: `{state, rationale, evidence_refs[]}` (spec.md §4.6).
pub fn judge_condition_tool() -> Value {
    json!({
        "type": "function",
        "name": "judge_condition",
        "description": "Judge whether the latest evidence satisfies, fails, or leaves unknown a condition.",
        "parameters": {
            "type": "object",
            "properties": {
                "schema_version": { "type": "integer" },
                "stage": { "type": "string" },
                "state": { "type": "string", "enum": ["satisfied", "failed", "unknown"] },
                "rationale": { "type": "string" },
                "evidence_refs": {
                    "type": "array",
                    "items": { "type": "integer" }
                }
            },
            "required": ["schema_version", "stage", "state", "rationale", "evidence_refs"]
        }
    })
}
