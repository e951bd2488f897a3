use anchor_core::model::{DiscoverObservation, ExecObservation};

use crate::error::AgentError;

/// Parses and validates a `discover` response (spec.md §4.3 step 4).
/// `schema_version`/`stage` mismatches and an empty or over-long highlight
/// list are all rejected here; truncation to three highlights already
/// happened upstream at the source that produced valid JSON, so this
/// function only needs to check, not repair.
pub fn validate_discover(raw: &str) -> Result<DiscoverObservation, AgentError> {
    let observation: DiscoverObservation = serde_json::from_str(raw)?;
    if !observation.is_valid() {
        return Err(AgentError::InvalidObservation(format!(
            "discover observation failed validation: schema_version={}, stage={}, highlights={}",
            observation.schema_version,
            observation.stage,
            observation.evidence.highlights.len(),
        )));
    }
    Ok(observation)
}

/// Parses and enforces the missing-citation invariant on an `exec` response
/// (spec.md §4.3 step 4). Unlike discover, an exec observation that fails
/// the citation invariant is repaired in place rather than rejected — the
/// rewritten `summary="error: missing-citation"` shape is itself valid.
pub fn validate_exec(raw: &str) -> Result<ExecObservation, AgentError> {
    let mut observation: ExecObservation = serde_json::from_str(raw)?;
    if observation.schema_version != 1 || observation.stage != "exec" {
        return Err(AgentError::InvalidObservation(format!(
            "exec observation failed validation: schema_version={}, stage={}",
            observation.schema_version, observation.stage,
        )));
    }
    observation.enforce_citation_invariant();
    Ok(observation)
}
