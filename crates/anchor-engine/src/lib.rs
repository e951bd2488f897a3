#![forbid(unsafe_code)]

//! Derive/plan/exec/judge/narrow pipeline engine and two-phase
//! breadth/depth scheduler: the part of the orchestrator that turns a
//! seeded claim into a resolved [`anchor_core::model::Finding`].

mod collaborators;
mod config;
mod derive;
mod error;
mod exec;
mod judge;
mod narrow;
mod pipeline;
mod plan;
mod scheduler;
mod scoring;
mod verdict;

pub use collaborators::{BoxFuture, LlmCollaborator, TaskCollaborator};
pub use config::EngineConfig;
pub use derive::derive_conditions;
pub use error::EngineError;
pub use exec::{apply_batch, run_batch, TaskResult};
pub use judge::judge_condition;
pub use narrow::narrow_condition;
pub use pipeline::Pipeline;
pub use plan::plan_tasks;
pub use scheduler::{breadth_pass, depth_pass, resolve_condition};
pub use scoring::score_condition;
pub use verdict::finalize as finalize_verdict;
