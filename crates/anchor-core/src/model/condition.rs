use serde::{Deserialize, Serialize};

/// Terminal (or in-progress) resolution state of a [`Condition`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConditionState {
    Unknown,
    Satisfied,
    Failed,
}

impl Default for ConditionState {
    fn default() -> Self {
        ConditionState::Unknown
    }
}

/// A minimal, objectively checkable predicate whose collective resolution
/// decides a [`crate::model::Finding`]'s claim. See spec.md §3.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    pub description: String,
    pub why: String,
    pub accept: String,
    pub reject: String,
    #[serde(default)]
    pub suggested_tasks: Vec<String>,
    #[serde(default)]
    pub state: ConditionState,
    #[serde(default)]
    pub rationale: String,
    /// Raw observation JSON strings, append-only.
    #[serde(default)]
    pub evidence: Vec<String>,
    /// Indices into `evidence` the current verdict rests on.
    #[serde(default)]
    pub evidence_refs: Vec<usize>,
    #[serde(default)]
    pub subconditions: Vec<Condition>,
    #[serde(default)]
    pub used_verbs: Vec<String>,
    #[serde(default)]
    pub last_verb: Option<String>,
    /// Which scheduler pass most recently touched this condition: `0` before
    /// any pass runs, `1` after the mandatory breadth pass, `>1` during the
    /// depth pass. Bookkeeping only (see SPEC_FULL.md §4).
    #[serde(default)]
    pub step_index: u32,
}

impl Condition {
    pub fn new(
        description: impl Into<String>,
        why: impl Into<String>,
        accept: impl Into<String>,
        reject: impl Into<String>,
        suggested_tasks: Vec<String>,
    ) -> Self {
        Self {
            description: description.into(),
            why: why.into(),
            accept: accept.into(),
            reject: reject.into(),
            suggested_tasks,
            state: ConditionState::Unknown,
            rationale: String::new(),
            evidence: Vec::new(),
            evidence_refs: Vec::new(),
            subconditions: Vec::new(),
            used_verbs: Vec::new(),
            last_verb: None,
            step_index: 0,
        }
    }

    /// Appends an executed-task verb to the diversity bookkeeping, updating
    /// `last_verb` and inserting into `used_verbs` if unseen.
    pub fn record_verb(&mut self, verb: &str) {
        self.last_verb = Some(verb.to_string());
        if !self.used_verbs.iter().any(|v| v == verb) {
            self.used_verbs.push(verb.to_string());
        }
    }

    /// Aggregates this condition's own state from the terminal states of its
    /// `subconditions`, per spec.md §4.6 NARROW aggregation rule. No-op if
    /// there are no subconditions.
    pub fn aggregate_from_subconditions(&mut self) {
        if self.subconditions.is_empty() {
            return;
        }
        let states: Vec<ConditionState> = self.subconditions.iter().map(|c| c.state).collect();
        let any_satisfied = states.iter().any(|s| *s == ConditionState::Satisfied);
        let any_failed = states.iter().any(|s| *s == ConditionState::Failed);
        let all_satisfied = states.iter().all(|s| *s == ConditionState::Satisfied);

        self.state = if all_satisfied {
            ConditionState::Satisfied
        } else if any_failed && !any_satisfied {
            ConditionState::Failed
        } else {
            ConditionState::Unknown
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(state: ConditionState) -> Condition {
        let mut c = Condition::new("d", "w", "a", "r", vec![]);
        c.state = state;
        c
    }

    #[test]
    fn aggregate_all_satisfied() {
        let mut parent = Condition::new("p", "w", "a", "r", vec![]);
        parent.subconditions = vec![cond(ConditionState::Satisfied), cond(ConditionState::Satisfied)];
        parent.aggregate_from_subconditions();
        assert_eq!(parent.state, ConditionState::Satisfied);
    }

    #[test]
    fn aggregate_any_failed_none_satisfied() {
        let mut parent = Condition::new("p", "w", "a", "r", vec![]);
        parent.subconditions = vec![cond(ConditionState::Failed), cond(ConditionState::Unknown)];
        parent.aggregate_from_subconditions();
        assert_eq!(parent.state, ConditionState::Failed);
    }

    #[test]
    fn aggregate_mixed_stays_unknown() {
        let mut parent = Condition::new("p", "w", "a", "r", vec![]);
        parent.subconditions = vec![cond(ConditionState::Failed), cond(ConditionState::Satisfied)];
        parent.aggregate_from_subconditions();
        assert_eq!(parent.state, ConditionState::Unknown);
    }

    #[test]
    fn record_verb_tracks_last_and_used() {
        let mut c = Condition::new("d", "w", "a", "r", vec![]);
        c.record_verb("search");
        c.record_verb("read-file");
        c.record_verb("search");
        assert_eq!(c.last_verb.as_deref(), Some("search"));
        assert_eq!(c.used_verbs, vec!["search", "read-file"]);
    }
}
