#![forbid(unsafe_code)]

//! Client for the LLM reasoning service that drives DERIVE, PLAN, JUDGE,
//! and NARROW. Deterministic request shape, content-addressed memoization,
//! and a multi-shape tool-call extractor tolerant of provider response
//! drift.

mod client;
mod error;
mod memo;
mod parse;
mod schema;

pub use client::{LlmClient, LlmClientBuilder};
pub use error::LlmError;
pub use memo::{MemoKey, ResponseMemo};
pub use parse::parse_tool_call;
pub use schema::{emit_conditions_tool, emit_tasks_tool, judge_condition_tool};
