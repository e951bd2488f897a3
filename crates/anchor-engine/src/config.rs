/// Resolved engine configuration. CLI flag > environment variable >
/// built-in default, per SPEC_FULL.md §3; `anchor-cli` is responsible for
/// that precedence and hands the engine the single resolved value.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub model: String,
    pub reasoning_effort: Option<String>,
    pub service_tier: Option<String>,
    pub workers: usize,
    pub bfs_budget: usize,
    pub max_steps: u32,
    pub plan_diversity: bool,
}

impl EngineConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            reasoning_effort: None,
            service_tier: None,
            workers: default_workers(),
            bfs_budget: default_bfs_budget(),
            max_steps: 3,
            plan_diversity: default_plan_diversity(),
        }
    }

    pub fn reasoning_effort(mut self, effort: impl Into<String>) -> Self {
        self.reasoning_effort = Some(effort.into());
        self
    }

    pub fn service_tier(mut self, tier: impl Into<String>) -> Self {
        self.service_tier = Some(tier.into());
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn bfs_budget(mut self, budget: usize) -> Self {
        self.bfs_budget = budget;
        self
    }

    pub fn max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn plan_diversity(mut self, enabled: bool) -> Self {
        self.plan_diversity = enabled;
        self
    }
}

fn default_workers() -> usize {
    std::env::var("ANCHOR_WORKERS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(4)
}

fn default_bfs_budget() -> usize {
    std::env::var("ANCHOR_BFS_BUDGET")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10)
}

fn default_plan_diversity() -> bool {
    std::env::var("ANCHOR_PLAN_DIVERSITY")
        .ok()
        .map(|v| v != "0" && !v.eq_ignore_ascii_case("false") && !v.eq_ignore_ascii_case("off"))
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = EngineConfig::new("gpt-test");
        assert_eq!(config.bfs_budget, 10);
        assert_eq!(config.max_steps, 3);
        assert!(config.plan_diversity);
    }
}
