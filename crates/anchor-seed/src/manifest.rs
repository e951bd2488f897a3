use std::collections::HashSet;
use std::path::Path;

use anchor_core::paths::repo_rel;

use crate::error::SeedError;

/// Parses a manifest file: one repository-relative path per line, blank
/// lines ignored. Missing files, duplicates, and out-of-repo entries are
/// all fatal (spec.md §4.5 step 1, §6).
pub fn read_manifest(manifest_path: &Path, repo_root: &Path) -> Result<Vec<String>, SeedError> {
    let text = std::fs::read_to_string(manifest_path).map_err(|source| SeedError::Io {
        path: manifest_path.display().to_string(),
        source,
    })?;

    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let rel = repo_rel(repo_root, Path::new(line))?;
        if !repo_root.join(&rel).is_file() {
            return Err(SeedError::MissingFile { path: rel });
        }
        if !seen.insert(rel.clone()) {
            return Err(SeedError::DuplicateEntry { path: rel });
        }
        entries.push(rel);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_manifest_entries_in_order() {
        let repo = tempfile::tempdir().unwrap();
        std::fs::write(repo.path().join("a.py"), b"a").unwrap();
        std::fs::write(repo.path().join("b.py"), b"b").unwrap();
        let manifest = repo.path().join("manifest.txt");
        std::fs::write(&manifest, "a.py\n\nb.py\n").unwrap();

        let entries = read_manifest(&manifest, repo.path()).unwrap();
        assert_eq!(entries, vec!["a.py".to_string(), "b.py".to_string()]);
    }

    #[test]
    fn missing_file_is_fatal() {
        let repo = tempfile::tempdir().unwrap();
        let manifest = repo.path().join("manifest.txt");
        std::fs::write(&manifest, "missing.py\n").unwrap();
        let result = read_manifest(&manifest, repo.path());
        assert!(matches!(result, Err(SeedError::MissingFile { .. })));
    }

    #[test]
    fn duplicate_entry_is_fatal() {
        let repo = tempfile::tempdir().unwrap();
        std::fs::write(repo.path().join("a.py"), b"a").unwrap();
        let manifest = repo.path().join("manifest.txt");
        std::fs::write(&manifest, "a.py\na.py\n").unwrap();
        let result = read_manifest(&manifest, repo.path());
        assert!(matches!(result, Err(SeedError::DuplicateEntry { .. })));
    }

    #[test]
    fn escaping_entry_is_fatal() {
        let repo = tempfile::tempdir().unwrap();
        let manifest = repo.path().join("manifest.txt");
        std::fs::write(&manifest, "../outside.py\n").unwrap();
        let result = read_manifest(&manifest, repo.path());
        assert!(matches!(result, Err(SeedError::Path(_))));
    }
}
