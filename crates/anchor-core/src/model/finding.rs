use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::model::condition::{Condition, ConditionState};

/// Where a seed originated from, per spec.md §3/§4.5.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeedSource {
    Manual,
    Hotspot,
    Diff,
    Dep,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FindingStatus {
    Seeded,
    Processed,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictState {
    TruePositive,
    FalsePositive,
    Unknown,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Verdict {
    pub state: VerdictState,
    pub reason: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Provenance {
    pub run_id: String,
    pub created_at: String,
    pub input_hash: String,
    pub file_size: u64,
    pub path: String,
}

/// One batch of tasks executed for a condition, appended to a finding's
/// `tasks_log` on every EXEC pass (spec.md §3 lifecycle: Resolution).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TasksLogEntry {
    pub condition: String,
    pub executed: Vec<String>,
}

/// The per-claim record, persisted atomically as `finding_<id>.json`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    pub finding_id: String,
    pub schema_version: u32,
    pub orchestrator_version: String,
    pub claim: String,
    pub files: Vec<String>,
    pub evidence: SeedEvidence,
    pub seed_source: SeedSource,
    pub provenance: Provenance,
    pub status: FindingStatus,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub tasks_log: Vec<TasksLogEntry>,
    #[serde(default)]
    pub verdict: Option<Verdict>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SeedEvidence {
    pub highlights: Vec<crate::model::observation::Highlight>,
}

impl Finding {
    /// Derives a stable short identifier from the primary file's
    /// repository-relative path: the first 12 hex characters of its SHA-256
    /// digest. Stable across runs for the same path (spec.md §3/§8).
    pub fn derive_finding_id(primary_path_repo_rel: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(primary_path_repo_rel.as_bytes());
        let digest = hasher.finalize();
        hex::encode(digest)[..12].to_string()
    }

    pub fn new(
        claim: impl Into<String>,
        files: Vec<String>,
        seed_evidence: SeedEvidence,
        seed_source: SeedSource,
        provenance: Provenance,
        orchestrator_version: impl Into<String>,
    ) -> Self {
        let primary = files.first().cloned().unwrap_or_default();
        Self {
            finding_id: Self::derive_finding_id(&primary),
            schema_version: 1,
            orchestrator_version: orchestrator_version.into(),
            claim: claim.into(),
            files,
            evidence: seed_evidence,
            seed_source,
            provenance,
            status: FindingStatus::Seeded,
            conditions: Vec::new(),
            tasks_log: Vec::new(),
            verdict: None,
        }
    }

    /// The primary file this finding's claim references.
    pub fn primary_file(&self) -> Option<&str> {
        self.files.first().map(String::as_str)
    }

    /// Computes and stores the finding-level verdict from the terminal state
    /// multiset of top-level conditions (spec.md §4.6 "Finding-level
    /// verdict"). Idempotent; intended to be called exactly once, at the very
    /// end of the pipeline, per spec.md §3's lifecycle note.
    pub fn finalize_verdict(&mut self) {
        let states: Vec<ConditionState> = self.conditions.iter().map(|c| c.state).collect();
        let all_satisfied =
            !states.is_empty() && states.iter().all(|s| *s == ConditionState::Satisfied);
        let any_failed = states.iter().any(|s| *s == ConditionState::Failed);
        let any_satisfied = states.iter().any(|s| *s == ConditionState::Satisfied);

        let verdict = if all_satisfied {
            Verdict {
                state: VerdictState::TruePositive,
                reason: "all conditions satisfied".to_string(),
            }
        } else if any_failed && !any_satisfied {
            Verdict {
                state: VerdictState::FalsePositive,
                reason: "at least one condition failed".to_string(),
            }
        } else {
            Verdict {
                state: VerdictState::Unknown,
                reason: "conditions unresolved".to_string(),
            }
        };

        self.verdict = Some(verdict);
        self.status = FindingStatus::Processed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provenance() -> Provenance {
        Provenance {
            run_id: "run-1".into(),
            created_at: "1970-01-01T00:00:00Z".into(),
            input_hash: "deadbeef".into(),
            file_size: 10,
            path: "src/app.py".into(),
        }
    }

    fn finding_with_states(states: &[ConditionState]) -> Finding {
        let mut finding = Finding::new(
            "claim",
            vec!["src/app.py".into()],
            SeedEvidence { highlights: vec![] },
            SeedSource::Manual,
            provenance(),
            "0.1.0",
        );
        finding.conditions = states
            .iter()
            .map(|s| {
                let mut c = Condition::new("d", "w", "a", "r", vec![]);
                c.state = *s;
                c
            })
            .collect();
        finding
    }

    #[test]
    fn finding_id_is_deterministic_for_same_path() {
        let a = Finding::derive_finding_id("src/app.py");
        let b = Finding::derive_finding_id("src/app.py");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
    }

    #[test]
    fn finding_id_differs_for_different_paths() {
        let a = Finding::derive_finding_id("src/app.py");
        let b = Finding::derive_finding_id("src/other.py");
        assert_ne!(a, b);
    }

    #[test]
    fn verdict_true_positive_when_all_satisfied() {
        let mut finding = finding_with_states(&[ConditionState::Satisfied, ConditionState::Satisfied]);
        finding.finalize_verdict();
        assert_eq!(finding.verdict.unwrap().state, VerdictState::TruePositive);
    }

    #[test]
    fn verdict_false_positive_when_any_failed_none_satisfied() {
        let mut finding = finding_with_states(&[ConditionState::Failed, ConditionState::Unknown]);
        finding.finalize_verdict();
        assert_eq!(finding.verdict.unwrap().state, VerdictState::FalsePositive);
    }

    #[test]
    fn verdict_unknown_otherwise() {
        let mut finding = finding_with_states(&[ConditionState::Unknown]);
        finding.finalize_verdict();
        assert_eq!(finding.verdict.unwrap().state, VerdictState::Unknown);

        let mut mixed = finding_with_states(&[ConditionState::Satisfied, ConditionState::Failed]);
        mixed.finalize_verdict();
        assert_eq!(mixed.verdict.unwrap().state, VerdictState::Unknown);
    }

    #[test]
    fn finalize_verdict_marks_finding_processed() {
        let mut finding = finding_with_states(&[ConditionState::Satisfied]);
        finding.finalize_verdict();
        assert_eq!(finding.status, FindingStatus::Processed);
    }
}
