use std::path::PathBuf;
use std::sync::Arc;

use anchor_core::model::{write_finding, Finding};

use crate::collaborators::{LlmCollaborator, TaskCollaborator};
use crate::config::EngineConfig;
use crate::derive::derive_conditions;
use crate::error::EngineError;
use crate::scheduler::{breadth_pass, depth_pass};
use crate::verdict;

/// Drives one [`Finding`] through DERIVE, the breadth pass, the depth pass,
/// and verdict assignment, persisting the finding atomically after each
/// stage (spec.md §3 lifecycle, §4.6). Holds the collaborators and
/// directories shared across every finding in a run.
pub struct Pipeline<'a> {
    llm: &'a dyn LlmCollaborator,
    agent: Arc<dyn TaskCollaborator>,
    config: EngineConfig,
    findings_dir: PathBuf,
    repo_root: PathBuf,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        llm: &'a dyn LlmCollaborator,
        agent: Arc<dyn TaskCollaborator>,
        config: EngineConfig,
        findings_dir: PathBuf,
        repo_root: PathBuf,
    ) -> Self {
        Self {
            llm,
            agent,
            config,
            findings_dir,
            repo_root,
        }
    }

    /// Runs the full per-finding state machine, returning the finding in its
    /// terminal, persisted state.
    pub async fn run_finding(
        &self,
        mut finding: Finding,
        repo_content_hash: &str,
    ) -> Result<Finding, EngineError> {
        let path = finding.primary_file().unwrap_or_default().to_string();

        let conditions = derive_conditions(
            self.llm,
            &self.config,
            &finding.claim,
            &finding.files,
            &finding.evidence.highlights,
        )
        .await?;
        finding.conditions = conditions;
        write_finding(&self.findings_dir, &finding)?;

        breadth_pass(
            self.llm,
            Arc::clone(&self.agent),
            &self.config,
            &mut finding.conditions,
            &path,
            &self.repo_root,
            repo_content_hash,
            &mut finding.tasks_log,
        )
        .await?;
        write_finding(&self.findings_dir, &finding)?;

        depth_pass(
            self.llm,
            Arc::clone(&self.agent),
            &self.config,
            &mut finding.conditions,
            &path,
            &self.repo_root,
            repo_content_hash,
            &mut finding.tasks_log,
        )
        .await?;
        write_finding(&self.findings_dir, &finding)?;

        verdict::finalize(&mut finding);
        write_finding(&self.findings_dir, &finding)?;

        Ok(finding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::BoxFuture;
    use anchor_agent::AgentObservation;
    use anchor_core::model::{
        ExecObservation, Provenance, SeedEvidence, SeedSource, VerdictState,
    };
    use serde_json::{json, Value};

    struct FakeLlm;
    impl LlmCollaborator for FakeLlm {
        fn generate<'a>(
            &'a self,
            _model: &'a str,
            _messages: &'a Value,
            _tools: &'a [Value],
            tool_choice: Option<&'a str>,
            _effort: Option<&'a str>,
            _service_tier: Option<&'a str>,
        ) -> BoxFuture<'a, Result<(String, Value), EngineError>> {
            let name = tool_choice.unwrap_or_default().to_string();
            Box::pin(async move {
                let response = match name.as_str() {
                    "emit_conditions" => json!({
                        "conditions": [
                            {"desc": "sink reachable", "why": "w", "accept": "a", "reject": "r", "suggested_tasks": []}
                        ]
                    }),
                    "emit_tasks" => json!({
                        "tasks": [{"task": "search for sink", "why": "w", "mode": "exec"}]
                    }),
                    "judge_condition" => json!({
                        "state": "satisfied",
                        "rationale": "clear",
                        "evidence_refs": [0]
                    }),
                    other => json!({ "tool": other }),
                };
                Ok((name, response))
            })
        }
    }

    struct FakeAgent;
    impl TaskCollaborator for FakeAgent {
        fn run_task<'a>(
            &'a self,
            task_str: &'a str,
            _repo_content_hash: &'a str,
        ) -> BoxFuture<'a, Result<AgentObservation, EngineError>> {
            Box::pin(async move {
                Ok(AgentObservation::Exec(ExecObservation::new(
                    format!("ran {task_str}"),
                    vec![anchor_core::model::Citation {
                        path: "a.py".into(),
                        start_line: 1,
                        end_line: 2,
                        sha1: None,
                    }],
                )))
            })
        }
    }

    #[tokio::test]
    async fn run_finding_reaches_true_positive_verdict() {
        let llm = FakeLlm;
        let agent: Arc<dyn TaskCollaborator> = Arc::new(FakeAgent);
        let config = EngineConfig::new("gpt-test");
        let findings_dir = tempfile::tempdir().unwrap();
        let repo_root = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            &llm,
            agent,
            config,
            findings_dir.path().to_path_buf(),
            repo_root.path().to_path_buf(),
        );

        let finding = Finding::new(
            "claim",
            vec!["a.py".into()],
            SeedEvidence { highlights: vec![] },
            SeedSource::Manual,
            Provenance {
                run_id: "r1".into(),
                created_at: "1970-01-01T00:00:00Z".into(),
                input_hash: "h".into(),
                file_size: 1,
                path: "a.py".into(),
            },
            "0.1.0",
        );

        let result = pipeline.run_finding(finding, "repohash").await.unwrap();
        assert_eq!(result.verdict.unwrap().state, VerdictState::TruePositive);
        assert!(anchor_core::model::finding_path(findings_dir.path(), &result.finding_id).exists());
    }
}
