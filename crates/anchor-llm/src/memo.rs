use std::path::PathBuf;

use anchor_core::atomic::atomic_write;
use anchor_core::error::CoreError;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Content-addressed key over the canonical JSON of `(model, messages,
/// tools, tool_choice)` (spec.md §4.4 step 1). Canonical here means
/// `serde_json`'s default map key ordering, which is insertion order for
/// `serde_json::Map` — callers must build `messages`/`tools` deterministically
/// for the key to be stable, which the client already does.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemoKey {
    digest_hex: String,
}

impl MemoKey {
    pub fn new(model: &str, messages: &Value, tools: &Value, tool_choice: &Value) -> Self {
        let canonical = serde_json::json!({
            "model": model,
            "messages": messages,
            "tools": tools,
            "tool_choice": tool_choice,
        });
        let mut hasher = Sha256::new();
        hasher.update(canonical.to_string().as_bytes());
        Self {
            digest_hex: hex::encode(hasher.finalize()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.digest_hex
    }
}

/// Optional memoization layer enabled by setting `LLM_MEMO_DIR` (spec.md
/// §6). When disabled, every lookup misses and every write is a no-op, so
/// the client can use the same code path regardless.
#[derive(Clone, Debug)]
pub struct ResponseMemo {
    dir: Option<PathBuf>,
}

impl ResponseMemo {
    pub fn from_env() -> Self {
        Self {
            dir: std::env::var_os("LLM_MEMO_DIR").map(PathBuf::from),
        }
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    fn entry_path(&self, key: &MemoKey) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(format!("{}.json", key.as_str())))
    }

    pub fn get(&self, key: &MemoKey) -> Option<Value> {
        let path = self.entry_path(key)?;
        let text = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&text).ok()
    }

    pub fn put(&self, key: &MemoKey, response: &Value) -> Result<(), CoreError> {
        let Some(path) = self.entry_path(key) else {
            return Ok(());
        };
        let bytes = serde_json::to_vec(response).expect("Value serialization is infallible");
        atomic_write(&path, &bytes)
    }
}
