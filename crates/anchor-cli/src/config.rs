use std::path::PathBuf;

use anchor_seed::Category;
use clap::Parser;

use crate::error::CliError;
use crate::live::LiveFormat;

/// `anchor` CLI surface (spec.md §6 "CLI").
#[derive(Parser, Debug)]
#[command(name = "anchor", about = "Deterministic multi-stage security-audit orchestrator")]
pub struct CliArgs {
    /// Repository-relative path manifest, one file per line.
    #[arg(long, default_value = "manifest.txt")]
    pub manifest: PathBuf,

    /// Directory findings and run metadata are written under.
    #[arg(long)]
    pub findings_dir: PathBuf,

    /// Root of the repository being audited.
    #[arg(long)]
    pub repo_root: PathBuf,

    /// Reasoning-model identifier passed to the LLM client.
    #[arg(long)]
    pub model: String,

    #[arg(long = "reasoning-effort")]
    pub reasoning_effort: Option<String>,

    #[arg(long = "service-tier")]
    pub service_tier: Option<String>,

    /// Emit a live tracing event per stage transition instead of only at
    /// the end of a run.
    #[arg(long)]
    pub live: bool,

    #[arg(long = "live-format")]
    pub live_format: Option<String>,

    #[arg(long, short)]
    pub verbose: bool,

    #[arg(long = "git-since")]
    pub git_since: Option<String>,

    #[arg(long = "git-window")]
    pub git_window: Option<u32>,
}

/// Fully resolved configuration: CLI flag > environment variable >
/// built-in default (SPEC_FULL.md §3, spec.md §6 "Environment flags").
pub struct ResolvedConfig {
    pub manifest: PathBuf,
    pub findings_dir: PathBuf,
    pub repo_root: PathBuf,
    pub model: String,
    pub reasoning_effort: Option<String>,
    pub service_tier: Option<String>,
    pub live: bool,
    pub live_format: LiveFormat,
    pub verbose: bool,
    pub git_since: Option<String>,
    pub git_window_days: u32,
    pub hotspots_enabled: bool,
    pub hotspot_categories: Vec<Category>,
    pub auto_lens_enabled: bool,
    pub plan_diversity: bool,
    pub workers: usize,
    pub bfs_budget: usize,
}

impl ResolvedConfig {
    pub fn resolve(args: CliArgs) -> Result<Self, CliError> {
        let live = args.live || env_flag("ANCHOR_LIVE").unwrap_or(false);
        let live_format_str = args
            .live_format
            .or_else(|| std::env::var("ANCHOR_LIVE_FORMAT").ok())
            .unwrap_or_else(|| "text".to_string());
        let live_format = LiveFormat::parse(&live_format_str)
            .ok_or_else(|| CliError::InvalidLiveFormat(live_format_str.clone()))?;

        let git_since = args.git_since.or_else(|| std::env::var("ANCHOR_GIT_SINCE").ok());
        let git_window_days = args
            .git_window
            .or_else(|| std::env::var("ANCHOR_GIT_WINDOW").ok().and_then(|v| v.parse().ok()))
            .unwrap_or(14);

        let hotspots_enabled = env_flag("ANCHOR_HOTSPOTS").unwrap_or(true);
        let hotspot_categories = match std::env::var("ANCHOR_HOTSPOT_CATEGORIES") {
            Ok(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(Category::parse)
                .collect(),
            Err(_) => Category::ALL.to_vec(),
        };
        let auto_lens_enabled = env_flag("ANCHOR_AUTO_LENS").unwrap_or(true);
        let plan_diversity = env_flag("ANCHOR_PLAN_DIVERSITY").unwrap_or(true);
        let workers = std::env::var("ANCHOR_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4);
        let bfs_budget = std::env::var("ANCHOR_BFS_BUDGET")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Ok(Self {
            manifest: args.manifest,
            findings_dir: args.findings_dir,
            repo_root: args.repo_root,
            model: args.model,
            reasoning_effort: args.reasoning_effort,
            service_tier: args.service_tier,
            live,
            live_format,
            verbose: args.verbose,
            git_since,
            git_window_days,
            hotspots_enabled,
            hotspot_categories,
            auto_lens_enabled,
            plan_diversity,
            workers,
            bfs_budget,
        })
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| !(v == "0" || v.eq_ignore_ascii_case("false") || v.eq_ignore_ascii_case("off")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            manifest: "manifest.txt".into(),
            findings_dir: "findings".into(),
            repo_root: "repo".into(),
            model: "gpt-test".into(),
            reasoning_effort: None,
            service_tier: None,
            live: false,
            live_format: None,
            verbose: false,
            git_since: None,
            git_window: None,
        }
    }

    #[test]
    fn env_flag_parses_common_falsy_spellings() {
        assert_eq!(env_flag("ANCHOR_TEST_FLAG_UNSET_XYZ"), None);
    }

    #[test]
    fn cli_flag_beats_builtin_default_for_git_window() {
        let mut args = base_args();
        args.git_window = Some(30);
        let resolved = ResolvedConfig::resolve(args).unwrap();
        assert_eq!(resolved.git_window_days, 30);
    }

    #[test]
    fn invalid_live_format_is_rejected() {
        let mut args = base_args();
        args.live_format = Some("xml".to_string());
        assert!(matches!(
            ResolvedConfig::resolve(args),
            Err(CliError::InvalidLiveFormat(_))
        ));
    }
}
