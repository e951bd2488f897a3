use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use anchor_agent::AgentObservation;
use anchor_core::atomic::atomic_write;
use anchor_core::model::{Finding, Highlight, Provenance, SeedEvidence, SeedSource};
use anchor_core::time::utc_now_rfc3339;
use anchor_engine::{EngineConfig, LlmCollaborator, Pipeline, TaskCollaborator};
use anchor_seed::{read_manifest, select_seeds, SeedEntry, SelectorConfig};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use crate::config::ResolvedConfig;
use crate::error::CliError;
use crate::live::LiveReporter;

#[derive(Serialize)]
struct GitInfo {
    commit: String,
    dirty: bool,
}

#[derive(Serialize)]
struct LlmInfo {
    model: String,
    reasoning_effort: Option<String>,
    service_tier: Option<String>,
}

#[derive(Serialize, Default)]
struct Counts {
    manifest_files: usize,
    findings_written: u32,
    errors: u32,
}

#[derive(Serialize, Default)]
struct SeedSourceCounts {
    hotspot: usize,
    dep: usize,
    diff: usize,
    manual: usize,
}

#[derive(Serialize)]
struct RunJson {
    run_id: String,
    manifest_path: String,
    started_at: String,
    finished_at: Option<String>,
    counts: Counts,
    git: GitInfo,
    version: String,
    manifest_sha1: String,
    llm: LlmInfo,
    seed_sources: SeedSourceCounts,
}

/// Output of running the discover stage for one seed: a synthesized claim
/// sentence plus the 1-3 highlight regions it cites (spec.md §3
/// `evidence.seed`).
struct DiscoveredSeed {
    claim: String,
    highlights: Vec<Highlight>,
}

/// Opens a timestamped run directory, persists `run.json` and every
/// `finding_<id>.json` under it, and drives [`Pipeline`] over every seed
/// sequentially (spec.md §5 "Across findings: processed sequentially").
pub struct RunDriver<'a> {
    config: ResolvedConfig,
    llm: &'a dyn LlmCollaborator,
    agent: Arc<dyn TaskCollaborator>,
    reporter: LiveReporter,
}

impl<'a> RunDriver<'a> {
    pub fn new(
        config: ResolvedConfig,
        llm: &'a dyn LlmCollaborator,
        agent: Arc<dyn TaskCollaborator>,
        reporter: LiveReporter,
    ) -> Self {
        Self {
            config,
            llm,
            agent,
            reporter,
        }
    }

    pub async fn run(&self) -> Result<PathBuf, CliError> {
        // Manifest validation (`read_manifest`/`select_seeds`, the only source
        // of `ManifestError`) must happen before any run directory or
        // `run.json` is created (spec.md §7/§8: "Fatal before any run
        // directory is created").
        let manifest_entries = read_manifest(&self.config.manifest, &self.config.repo_root)?;

        let selector_config = SelectorConfig {
            manifest_path: &self.config.manifest,
            repo_root: &self.config.repo_root,
            git_since: self.config.git_since.as_deref(),
            git_window_days: Some(self.config.git_window_days),
            hotspots_enabled: self.config.hotspots_enabled,
            hotspot_categories: &self.config.hotspot_categories,
            auto_lens_enabled: self.config.auto_lens_enabled,
        };
        let seeds = select_seeds(&selector_config)?;

        let run_id = format!("run-{}", utc_now_rfc3339().replace([':', '.'], "-"));
        let run_dir = self.config.findings_dir.join(&run_id);

        let manifest_bytes = std::fs::read(&self.config.manifest)
            .map_err(|e| CliError::Git(format!("failed to read manifest: {e}")))?;
        let manifest_sha1 = hex::encode(Sha256::digest(&manifest_bytes));

        let git = git_info(&self.config.repo_root);
        let repo_content_hash = hex::encode(Sha256::digest(
            format!("{}:{}", git.commit, git.dirty).as_bytes(),
        ));

        let mut seed_sources = SeedSourceCounts::default();
        for seed in &seeds {
            match seed.source {
                SeedSource::Hotspot => seed_sources.hotspot += 1,
                SeedSource::Dep => seed_sources.dep += 1,
                SeedSource::Diff => seed_sources.diff += 1,
                SeedSource::Manual => seed_sources.manual += 1,
            }
        }

        let mut run_json = RunJson {
            run_id: run_id.clone(),
            manifest_path: self.config.manifest.display().to_string(),
            started_at: utc_now_rfc3339(),
            finished_at: None,
            counts: Counts {
                manifest_files: manifest_entries.len(),
                findings_written: 0,
                errors: 0,
            },
            git,
            version: env!("CARGO_PKG_VERSION").to_string(),
            manifest_sha1,
            llm: LlmInfo {
                model: self.config.model.clone(),
                reasoning_effort: self.config.reasoning_effort.clone(),
                service_tier: self.config.service_tier.clone(),
            },
            seed_sources,
        };
        write_run_json(&run_dir, &run_json)?;

        let engine_config = EngineConfig::new(self.config.model.clone())
            .workers(self.config.workers)
            .bfs_budget(self.config.bfs_budget)
            .plan_diversity(self.config.plan_diversity);
        let engine_config = match &self.config.reasoning_effort {
            Some(effort) => engine_config.reasoning_effort(effort.clone()),
            None => engine_config,
        };
        let engine_config = match &self.config.service_tier {
            Some(tier) => engine_config.service_tier(tier.clone()),
            None => engine_config,
        };

        let pipeline = Pipeline::new(
            self.llm,
            Arc::clone(&self.agent),
            engine_config,
            run_dir.clone(),
            self.config.repo_root.clone(),
        );

        for seed in seeds {
            self.reporter.stage(&Finding::derive_finding_id(&seed.path), "discover");
            let discovered = match self.discover_seed(&seed, &repo_content_hash).await {
                Ok(discovered) => discovered,
                Err(err) => {
                    run_json.counts.errors += 1;
                    run_json.finished_at = Some(utc_now_rfc3339());
                    write_run_json(&run_dir, &run_json)?;
                    error!(path = %seed.path, error = %err, "aborting run on discover-stage error");
                    self.reporter
                        .finished(&run_id, run_json.counts.findings_written, run_json.counts.errors);
                    return Err(err);
                }
            };

            let provenance = Provenance {
                run_id: run_id.clone(),
                created_at: utc_now_rfc3339(),
                input_hash: repo_content_hash.clone(),
                file_size: std::fs::metadata(self.config.repo_root.join(&seed.path))
                    .map(|m| m.len())
                    .unwrap_or(0),
                path: seed.path.clone(),
            };
            let finding = Finding::new(
                discovered.claim,
                vec![seed.path.clone()],
                SeedEvidence {
                    highlights: discovered.highlights,
                },
                seed.source,
                provenance,
                env!("CARGO_PKG_VERSION"),
            );

            self.reporter.stage(&finding.finding_id, "derive");
            match pipeline.run_finding(finding, &repo_content_hash).await {
                Ok(_) => {
                    run_json.counts.findings_written += 1;
                    info!(path = %seed.path, "finding resolved");
                }
                Err(err) => {
                    run_json.counts.errors += 1;
                    run_json.finished_at = Some(utc_now_rfc3339());
                    write_run_json(&run_dir, &run_json)?;
                    error!(path = %seed.path, error = %err, "aborting run on terminal pipeline error");
                    self.reporter.finished(&run_id, run_json.counts.findings_written, run_json.counts.errors);
                    return Err(CliError::from(err));
                }
            }
        }

        run_json.finished_at = Some(utc_now_rfc3339());
        write_run_json(&run_dir, &run_json)?;
        self.reporter.finished(&run_id, run_json.counts.findings_written, run_json.counts.errors);
        Ok(run_dir)
    }

    /// Runs `codex:discover:<path>[::<lens>]` through the task agent and
    /// turns the resulting highlights into a claim sentence and seed
    /// evidence (spec.md §3 `evidence.seed`, §4.3 discover task shape).
    async fn discover_seed(
        &self,
        seed: &SeedEntry,
        repo_content_hash: &str,
    ) -> Result<DiscoveredSeed, CliError> {
        let task_str = match seed.lens.first() {
            Some(lens) => format!("codex:discover:{}::{}", seed.path, lens.as_str()),
            None => format!("codex:discover:{}", seed.path),
        };

        let observation = self.agent.run_task(&task_str, repo_content_hash).await?;
        let discover = match observation {
            AgentObservation::Discover(discover) => discover,
            AgentObservation::Exec(_) => {
                return Err(CliError::UnexpectedObservation(seed.path.clone()));
            }
        };

        let claim = discover
            .evidence
            .highlights
            .first()
            .map(|h| format!("{} warrants a security audit: {}", seed.path, h.why))
            .unwrap_or_else(|| format!("{} warrants a security audit", seed.path));

        Ok(DiscoveredSeed {
            claim,
            highlights: discover.evidence.highlights,
        })
    }
}

fn write_run_json(run_dir: &Path, run_json: &RunJson) -> Result<(), CliError> {
    let bytes = serde_json::to_vec_pretty(run_json).expect("RunJson serialization is infallible");
    atomic_write(&run_dir.join("run.json"), &bytes).map_err(CliError::from)
}

/// Shells out to `git` for the commit and dirty-tree status. Failure (no
/// git, not a repository) degrades to an `"unknown"` commit rather than
/// aborting the run — the orchestrator audits the files on disk regardless
/// of VCS metadata.
fn git_info(repo_root: &Path) -> GitInfo {
    let commit = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let dirty = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .map(|o| !o.stdout.is_empty())
        .unwrap_or(false);

    if commit == "unknown" {
        warn!("repository has no resolvable git HEAD; run.json will record commit=\"unknown\"");
    }

    GitInfo { commit, dirty }
}
