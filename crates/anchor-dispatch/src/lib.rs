#![forbid(unsafe_code)]

//! Subprocess dispatch for the Codex CLI: network-denied sandboxing, a
//! content-addressed response cache, and timeout/retry handling around each
//! invocation. Consumed by `anchor-agent`, which maps [`DispatchError`] and
//! [`ExecResult`] onto the task-level observation contract.

mod cache;
mod dispatcher;
mod error;
mod process;
mod result;
mod sandbox;
mod version;

pub use cache::{CacheKey, ResponseCache};
pub use dispatcher::{CodexDispatcher, CodexDispatcherBuilder};
pub use error::DispatchError;
pub use result::ExecResult;
pub use sandbox::NetworkSandbox;
pub use version::probe_codex_version;
