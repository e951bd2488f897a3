use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// Writes `bytes` to `path` without ever leaving the target in a partially
/// written state.
///
/// Creates `path`'s parent directory if missing, writes the content to a
/// unique temp file in that *same* directory, then renames the temp file
/// over `path`. Same-directory temp files guarantee the rename is an atomic
/// filesystem operation rather than a cross-device copy. On any failure the
/// temp file is removed and the original error is surfaced; `path` is left
/// exactly as it was before the call.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|source| CoreError::CreateParentDir {
        path: parent.to_path_buf(),
        source,
    })?;

    let temp_path = unique_temp_path(parent, path);

    let write_result = (|| -> Result<(), CoreError> {
        let mut file = std::fs::File::create(&temp_path).map_err(|source| CoreError::WriteTemp {
            path: temp_path.clone(),
            source,
        })?;
        file.write_all(bytes).map_err(|source| CoreError::WriteTemp {
            path: temp_path.clone(),
            source,
        })?;
        file.sync_all().map_err(|source| CoreError::WriteTemp {
            path: temp_path.clone(),
            source,
        })
    })();

    if let Err(err) = write_result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(err);
    }

    if let Err(source) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(CoreError::Rename {
            from: temp_path,
            to: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}

/// Reads the file at `path` as UTF-8 and deserializes it as JSON. A thin,
/// error-mapped counterpart to [`atomic_write`] for readers that expect the
/// on-disk representation Anchor itself produced.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CoreError> {
    let text = std::fs::read_to_string(path).map_err(|source| CoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn unique_temp_path(parent: &Path, target: &Path) -> PathBuf {
    let file_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("anchor");
    let unique = format!(
        ".{file_name}.{}.{}.tmp",
        std::process::id(),
        monotonic_suffix()
    );
    parent.join(unique)
}

/// A per-process monotonically increasing counter used purely to keep
/// concurrent temp-file names from colliding; it is not a timestamp and
/// carries no meaning outside this module.
fn monotonic_suffix() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_bytes_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/deep/finding_abc.json");
        atomic_write(&target, b"{\"a\":1}").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn leaves_no_temp_residue_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("finding_abc.json");
        atomic_write(&target, b"data").unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name(), "finding_abc.json");
    }

    #[test]
    fn overwrite_replaces_prior_content_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("finding_abc.json");
        atomic_write(&target, b"first").unwrap();
        atomic_write(&target, b"second").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "second");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn fails_cleanly_when_target_is_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("finding_abc.json");
        fs::create_dir(&target).unwrap();
        let result = atomic_write(&target, b"data");
        assert!(result.is_err());
        // no stray temp files left behind
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn read_json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("data.json");
        atomic_write(&target, br#"{"x": 42}"#).unwrap();
        let value: serde_json::Value = read_json(&target).unwrap();
        assert_eq!(value["x"], 42);
    }
}
