use std::path::Path;
use std::process::Command;

use anchor_core::paths::repo_rel;

use crate::error::SeedError;

/// Returns repository-relative paths changed since `since` (a git ref), or,
/// when `since` is `None`, within the last `window_days` (spec.md §4.5
/// step 3). Invokes `git` directly rather than a library, matching
/// `original_source/`'s reliance on the system `git` binary.
pub fn changed_paths(
    repo_root: &Path,
    since: Option<&str>,
    window_days: Option<u32>,
) -> Result<Vec<String>, SeedError> {
    let range = match since {
        Some(reference) => reference.to_string(),
        None => {
            let days = window_days.unwrap_or(14);
            format!("--since={days}.days.ago")
        }
    };

    let mut command = Command::new("git");
    command.arg("-C").arg(repo_root);
    if since.is_some() {
        command.args(["diff", "--name-only", &range]);
    } else {
        command.args(["log", &range, "--name-only", "--pretty=format:"]);
    }

    let output = command
        .output()
        .map_err(|e| SeedError::GitDiff(e.to_string()))?;
    if !output.status.success() {
        return Err(SeedError::GitDiff(
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let mut paths = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let full = repo_root.join(line);
        if !full.is_file() {
            continue;
        }
        let rel = repo_rel(repo_root, &full)?;
        if !paths.contains(&rel) {
            paths.push(rel);
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn git(repo: &Path, args: &[&str]) {
        let status = Command::new("git")
            .arg("-C")
            .arg(repo)
            .args(args)
            .status()
            .expect("git must be on PATH for this test");
        assert!(status.success(), "git {args:?} failed");
    }

    #[test]
    fn changed_paths_since_ref_finds_new_file() {
        let repo = tempfile::tempdir().unwrap();
        git(repo.path(), &["init", "-q"]);
        git(repo.path(), &["config", "user.email", "test@example.com"]);
        git(repo.path(), &["config", "user.name", "test"]);
        std::fs::write(repo.path().join("a.py"), b"a = 1\n").unwrap();
        git(repo.path(), &["add", "a.py"]);
        git(repo.path(), &["commit", "-q", "-m", "initial"]);

        std::fs::write(repo.path().join("b.py"), b"b = 2\n").unwrap();
        git(repo.path(), &["add", "b.py"]);
        git(repo.path(), &["commit", "-q", "-m", "second"]);

        let changed = changed_paths(repo.path(), Some("HEAD~1"), None).unwrap();
        assert_eq!(changed, vec!["b.py".to_string()]);
    }
}
