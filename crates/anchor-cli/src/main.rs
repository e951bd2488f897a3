mod config;
mod error;
mod live;
mod run;

use std::process::ExitCode;
use std::sync::Arc;

use anchor_agent::TaskAgent;
use anchor_dispatch::CodexDispatcher;
use anchor_engine::{LlmCollaborator, TaskCollaborator};
use anchor_llm::LlmClient;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::{CliArgs, ResolvedConfig};
use error::CliError;
use live::LiveReporter;
use run::RunDriver;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(run_dir) => {
            tracing::info!(run_dir = %run_dir.display(), "run complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "anchor run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<std::path::PathBuf, CliError> {
    let config = ResolvedConfig::resolve(args)?;

    let dispatcher = CodexDispatcher::builder().build();
    let task_agent = TaskAgent::new(dispatcher, config.repo_root.clone());
    let agent: Arc<dyn TaskCollaborator> = Arc::new(task_agent);

    let llm_client = LlmClient::builder().build()?;
    let llm: &dyn LlmCollaborator = &llm_client;

    let reporter = LiveReporter::new(config.live, config.live_format);
    let driver = RunDriver::new(config, llm, agent, reporter);
    driver.run().await
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
