use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, ResponseCache};
use crate::error::DispatchError;
use crate::process::{spawn_with_retry, tee_stream, ConsoleTarget};
use crate::result::ExecResult;
use crate::sandbox::NetworkSandbox;
use crate::version::probe_codex_version;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_RETRIES: u32 = 2;
const DEFAULT_BACKOFF_BASE: f64 = 2.0;

/// Launches the Codex binary under a read-only, network-denied sandbox,
/// enforces a wall-clock timeout with retry/backoff, and memoizes results in
/// a content-addressed [`ResponseCache`]. See spec.md §4.2.
#[derive(Clone)]
pub struct CodexDispatcher {
    binary: PathBuf,
    codex_version: String,
    timeout: Duration,
    retries: u32,
    backoff_base: f64,
    sandbox: NetworkSandbox,
    cache: ResponseCache,
}

pub struct CodexDispatcherBuilder {
    binary: PathBuf,
    timeout: Duration,
    retries: u32,
    backoff_base: f64,
    cache_dir: Option<PathBuf>,
}

impl Default for CodexDispatcherBuilder {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(
                std::env::var("CODEX_BINARY").unwrap_or_else(|_| "codex".to_string()),
            ),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
            cache_dir: None,
        }
    }
}

impl CodexDispatcherBuilder {
    pub fn binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn backoff_base(mut self, backoff_base: f64) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Builds the dispatcher, probing the network-denial sandbox and the
    /// Codex binary version exactly once. Both results are logged at
    /// `info!` so operators can tell whether the sandbox is actually active
    /// (spec.md §4.2).
    pub fn build(self) -> CodexDispatcher {
        let sandbox = NetworkSandbox::probe();
        info!(sandbox = sandbox.describe(), "codex network sandbox probe");

        let codex_version = probe_codex_version(&self.binary);
        debug!(binary = ?self.binary, version = %codex_version, "resolved codex version");

        let cache_dir = self
            .cache_dir
            .unwrap_or_else(|| std::env::temp_dir().join("anchor-codex-cache"));

        CodexDispatcher {
            binary: self.binary,
            codex_version,
            timeout: self.timeout,
            retries: self.retries,
            backoff_base: self.backoff_base,
            sandbox,
            cache: ResponseCache::new(cache_dir),
        }
    }
}

impl CodexDispatcher {
    pub fn builder() -> CodexDispatcherBuilder {
        CodexDispatcherBuilder::default()
    }

    pub fn codex_version(&self) -> &str {
        &self.codex_version
    }

    pub fn sandbox(&self) -> NetworkSandbox {
        self.sandbox
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Runs `prompt` against the Codex binary in `workdir`, honoring the
    /// response cache, timeout, and retry/backoff policy from spec.md §4.2.
    /// `repo_content_hash` is an opaque fingerprint of the target
    /// repository's content, supplied by the caller (the run driver), and
    /// participates in the cache key alongside `prompt` and the probed
    /// Codex version.
    pub async fn exec(
        &self,
        prompt: &str,
        workdir: &Path,
        repo_content_hash: &str,
    ) -> Result<ExecResult, DispatchError> {
        let cache_key = CacheKey::new(prompt, repo_content_hash, &self.codex_version);
        if let Some(cached) = self.cache.get(&cache_key) {
            debug!(key = cache_key.as_str(), "codex response cache hit");
            return Ok(cached);
        }

        let mut attempt: u32 = 0;
        loop {
            match self.exec_once(prompt, workdir).await {
                Ok(result) if result.success() => {
                    self.cache.put(&cache_key, &result)?;
                    return Ok(result);
                }
                Ok(result) => {
                    if attempt >= self.retries {
                        return Err(DispatchError::NonZeroExit {
                            status: result.returncode,
                            stderr: result.stderr,
                        });
                    }
                    self.sleep_backoff(attempt).await;
                    attempt += 1;
                }
                Err(DispatchError::Timeout { timeout }) => {
                    if attempt >= self.retries {
                        return Err(DispatchError::Timeout { timeout });
                    }
                    self.sleep_backoff(attempt).await;
                    attempt += 1;
                }
                Err(other) => return Err(other),
            }
        }
    }

    async fn sleep_backoff(&self, attempt: u32) {
        let seconds = self.backoff_base.powi(attempt as i32).max(0.0);
        time::sleep(Duration::from_secs_f64(seconds)).await;
    }

    async fn exec_once(&self, prompt: &str, workdir: &Path) -> Result<ExecResult, DispatchError> {
        let last_message_file = tempfile::NamedTempFile::new().map_err(DispatchError::TempFile)?;
        let last_message_path = last_message_file.path().to_path_buf();
        // Drop (but don't delete) the handle: codex will (re)create/write the
        // file itself; we just need a guaranteed-unique path.
        let _ = last_message_file.close();

        let argv = self.sandbox.wrap(build_argv(
            &self.binary,
            &last_message_path,
            workdir,
        ));

        let mut command = Command::new(&argv[0]);
        command
            .args(&argv[1..])
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        let mut child = spawn_with_retry(&mut command, &self.binary)?;

        let mut stdin = child.stdin.take().ok_or(DispatchError::StdinUnavailable)?;
        stdin
            .write_all(prompt.as_bytes())
            .await
            .map_err(DispatchError::StdinWrite)?;
        drop(stdin);

        let stdout = child.stdout.take().ok_or(DispatchError::StdoutUnavailable)?;
        let stderr = child.stderr.take().ok_or(DispatchError::StderrUnavailable)?;

        let stdout_task = tokio::spawn(tee_stream(stdout, ConsoleTarget::Stdout, false));
        let stderr_task = tokio::spawn(tee_stream(stderr, ConsoleTarget::Stderr, false));

        let start = std::time::Instant::now();
        let wait_result = time::timeout(self.timeout, child.wait()).await;

        let status = match wait_result {
            Ok(status) => status.map_err(|source| DispatchError::Wait { source })?,
            Err(_) => {
                warn!(timeout = ?self.timeout, "codex exceeded timeout, killing process");
                let _ = child.kill().await;
                let _ = child.wait().await;
                let _ = stdout_task.await;
                let _ = stderr_task.await;
                return Err(DispatchError::Timeout {
                    timeout: self.timeout,
                });
            }
        };

        let stdout_bytes = stdout_task.await??;
        let stderr_bytes = stderr_task.await??;
        let duration = start.elapsed();

        let last_message = std::fs::read_to_string(&last_message_path).unwrap_or_default();
        let _ = std::fs::remove_file(&last_message_path);

        Ok(ExecResult {
            stdout: if last_message.is_empty() {
                String::from_utf8_lossy(&stdout_bytes).into_owned()
            } else {
                last_message
            },
            stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
            returncode: status.code().unwrap_or(-1),
            duration,
            cmd: argv.iter().map(|s| s.to_string_lossy().into_owned()).collect(),
        })
    }
}

/// Builds the invariant Codex argv: `exec --output-last-message <tmp>
/// --skip-git-repo-check -C <workdir>`. No flag that would bypass Codex's
/// own approval/sandbox is ever included — the dispatcher refuses to grow
/// this list beyond what spec.md §4.2 names.
fn build_argv(binary: &Path, last_message_path: &Path, workdir: &Path) -> Vec<OsString> {
    vec![
        binary.as_os_str().to_owned(),
        OsString::from("exec"),
        OsString::from("--output-last-message"),
        last_message_path.as_os_str().to_owned(),
        OsString::from("--skip-git-repo-check"),
        OsString::from("-C"),
        workdir.as_os_str().to_owned(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_argv_matches_invariant_flag_set() {
        let argv = build_argv(Path::new("/usr/bin/codex"), Path::new("/tmp/out"), Path::new("/work"));
        let rendered: Vec<String> = argv.iter().map(|s| s.to_string_lossy().into_owned()).collect();
        assert_eq!(
            rendered,
            vec![
                "/usr/bin/codex",
                "exec",
                "--output-last-message",
                "/tmp/out",
                "--skip-git-repo-check",
                "-C",
                "/work",
            ]
        );
    }

    #[test]
    fn build_argv_never_includes_privileged_flags() {
        let argv = build_argv(Path::new("codex"), Path::new("/tmp/out"), Path::new("/work"));
        let rendered = argv
            .iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        assert!(!rendered.contains("bypass"));
        assert!(!rendered.contains("full-auto"));
        assert!(!rendered.contains("dangerously"));
    }

    #[tokio::test]
    async fn exec_against_missing_binary_surfaces_spawn_error() {
        let dispatcher = CodexDispatcher::builder()
            .binary("/nonexistent/definitely-not-codex")
            .retries(0)
            .cache_dir(tempfile::tempdir().unwrap().into_path())
            .build();
        let workdir = tempfile::tempdir().unwrap();
        let result = dispatcher.exec("hello", workdir.path(), "repohash").await;
        assert!(matches!(result, Err(DispatchError::Spawn { .. })));
    }
}
