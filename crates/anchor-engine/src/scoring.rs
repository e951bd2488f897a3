use std::path::Path;

use anchor_core::model::{Citation, Condition, ExecObservation};

const SINK_KEYWORDS: [&str; 3] = ["subprocess", "tarfile", "yaml.load"];
const TAINT_KEYWORDS: [&str; 3] = ["user-controlled", "taint", "entrypoint"];

/// Deterministic integer heuristic score for a condition, used to rank the
/// depth-pass queue (spec.md §4.6 "Scoring"). Pure aside from reading the
/// cited source regions off disk to check for sink keywords.
pub fn score_condition(condition: &Condition, repo_root: &Path) -> i32 {
    let Some(latest) = latest_exec_observation(condition) else {
        return 0;
    };

    let mut score = 0;

    if !latest.is_error() && !latest.citations.is_empty() {
        score += 2;
    }

    if latest
        .citations
        .iter()
        .any(|c| citation_region_contains_sink(repo_root, c))
    {
        score += 2;
    }

    let haystack = format!(
        "{} {}",
        latest.summary,
        latest.notes.as_deref().unwrap_or_default()
    )
    .to_lowercase();
    if TAINT_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
        score += 1;
    }

    score
}

/// Latest observation with a non-error summary, falling back to the most
/// recent entry if every one is an error or fails to parse (mirrors
/// `judge::latest_successful_index`).
fn latest_exec_observation(condition: &Condition) -> Option<ExecObservation> {
    let parsed: Vec<Option<ExecObservation>> = condition
        .evidence
        .iter()
        .map(|raw| serde_json::from_str(raw).ok())
        .collect();

    parsed
        .iter()
        .rev()
        .find_map(|obs| obs.as_ref().filter(|o| !o.is_error()).cloned())
        .or_else(|| parsed.last().cloned().flatten())
}

fn citation_region_contains_sink(repo_root: &Path, citation: &Citation) -> bool {
    let Ok(text) = std::fs::read_to_string(repo_root.join(&citation.path)) else {
        return false;
    };
    let start = citation.start_line.saturating_sub(1) as usize;
    let end = citation.end_line as usize;
    let region: String = text
        .lines()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect::<Vec<_>>()
        .join("\n");
    SINK_KEYWORDS.iter().any(|kw| region.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_core::model::Citation;

    fn condition_with_evidence(evidence: &str) -> Condition {
        let mut c = Condition::new("d", "w", "a", "r", vec![]);
        c.evidence.push(evidence.to_string());
        c
    }

    #[test]
    fn no_evidence_scores_zero() {
        let c = Condition::new("d", "w", "a", "r", vec![]);
        let repo = tempfile::tempdir().unwrap();
        assert_eq!(score_condition(&c, repo.path()), 0);
    }

    #[test]
    fn successful_observation_with_citation_scores_two() {
        let obs = ExecObservation::new(
            "found it",
            vec![Citation {
                path: "a.py".into(),
                start_line: 1,
                end_line: 1,
                sha1: None,
            }],
        );
        let c = condition_with_evidence(&serde_json::to_string(&obs).unwrap());
        let repo = tempfile::tempdir().unwrap();
        std::fs::write(repo.path().join("a.py"), b"x = 1\n").unwrap();
        assert_eq!(score_condition(&c, repo.path()), 2);
    }

    #[test]
    fn sink_keyword_in_cited_region_adds_two() {
        let obs = ExecObservation::new(
            "found it",
            vec![Citation {
                path: "a.py".into(),
                start_line: 1,
                end_line: 1,
                sha1: None,
            }],
        );
        let c = condition_with_evidence(&serde_json::to_string(&obs).unwrap());
        let repo = tempfile::tempdir().unwrap();
        std::fs::write(repo.path().join("a.py"), b"subprocess.run(['x'])\n").unwrap();
        assert_eq!(score_condition(&c, repo.path()), 4);
    }

    #[test]
    fn trailing_error_observation_does_not_suppress_prior_success() {
        let success = ExecObservation::new(
            "found it",
            vec![Citation {
                path: "a.py".into(),
                start_line: 1,
                end_line: 1,
                sha1: None,
            }],
        );
        let mut c = condition_with_evidence(&serde_json::to_string(&success).unwrap());
        c.evidence
            .push(serde_json::to_string(&ExecObservation::error("timeout")).unwrap());
        let repo = tempfile::tempdir().unwrap();
        std::fs::write(repo.path().join("a.py"), b"x = 1\n").unwrap();
        assert_eq!(score_condition(&c, repo.path()), 2);
    }

    #[test]
    fn taint_keyword_in_summary_adds_one() {
        let obs = ExecObservation::new("user-controlled input reaches sink", vec![]);
        let c = condition_with_evidence(&serde_json::to_string(&obs).unwrap());
        let repo = tempfile::tempdir().unwrap();
        assert_eq!(score_condition(&c, repo.path()), 1);
    }
}
