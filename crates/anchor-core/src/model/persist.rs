use std::path::{Path, PathBuf};

use crate::atomic::{atomic_write, read_json};
use crate::error::CoreError;
use crate::model::finding::Finding;

/// Returns the path a finding is persisted at within `findings_dir`, per
/// spec.md §6: `finding_<id>.json`.
pub fn finding_path(findings_dir: &Path, finding_id: &str) -> PathBuf {
    findings_dir.join(format!("finding_{finding_id}.json"))
}

/// Rewrites the finding end-to-end at its canonical path via [`atomic_write`].
/// Readers observe either the prior complete JSON or this new complete JSON,
/// never a partial file (spec.md §3 invariants).
pub fn write_finding(findings_dir: &Path, finding: &Finding) -> Result<(), CoreError> {
    let path = finding_path(findings_dir, &finding.finding_id);
    let bytes = serde_json::to_vec_pretty(finding).expect("Finding serialization is infallible");
    atomic_write(&path, &bytes)
}

/// Reads a finding back from disk.
pub fn read_finding(findings_dir: &Path, finding_id: &str) -> Result<Finding, CoreError> {
    read_json(&finding_path(findings_dir, finding_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::finding::{Provenance, SeedEvidence, SeedSource};

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let finding = Finding::new(
            "claim",
            vec!["a.py".into()],
            SeedEvidence { highlights: vec![] },
            SeedSource::Manual,
            Provenance {
                run_id: "r1".into(),
                created_at: "1970-01-01T00:00:00Z".into(),
                input_hash: "h".into(),
                file_size: 1,
                path: "a.py".into(),
            },
            "0.1.0",
        );
        write_finding(dir.path(), &finding).unwrap();
        let loaded = read_finding(dir.path(), &finding.finding_id).unwrap();
        assert_eq!(loaded, finding);
    }

    #[test]
    fn finding_path_matches_naming_convention() {
        let path = finding_path(Path::new("/runs/r1"), "abc123");
        assert_eq!(path, Path::new("/runs/r1/finding_abc123.json"));
    }
}
