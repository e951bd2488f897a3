use std::path::Path;
use std::process::{Command, Stdio};

/// Synchronously probes `codex --version`, used only to compose the response
/// cache fingerprint (spec.md §2 item 3). Returns `"unknown"` rather than
/// erroring when the binary is missing or unparseable — an unknown version
/// still participates in the cache key, it just means different unknown
/// binaries collide, which is acceptable for a best-effort fingerprint.
pub fn probe_codex_version(binary: &Path) -> String {
    Command::new(binary)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .ok()
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
