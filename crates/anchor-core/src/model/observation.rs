use serde::{Deserialize, Serialize};

/// A citation into a specific line range of a specific repository file,
/// optionally pinned to the file's content hash at observation time.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    pub path: String,
    pub start_line: u32,
    pub end_line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
}

/// A validated response from an `exec` stage task: `{schema_version=1,
/// stage="exec", summary, citations[], notes}`. If `summary` starts with
/// `"error:"`, `citations` must be empty — this invariant is enforced at
/// construction via [`ExecObservation::new`] / [`ExecObservation::error`]
/// rather than left to callers to remember.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExecObservation {
    pub schema_version: u32,
    pub stage: String,
    pub summary: String,
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ExecObservation {
    pub fn new(summary: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            schema_version: 1,
            stage: "exec".to_string(),
            summary: summary.into(),
            citations,
            notes: None,
        }
    }

    /// Builds an error observation: `summary` is forced to start with
    /// `"error:"` and `citations` is always empty, matching the
    /// `exec_observation` error shape spec.md requires for degraded tasks.
    pub fn error(reason: impl std::fmt::Display) -> Self {
        Self {
            schema_version: 1,
            stage: "exec".to_string(),
            summary: format!("error: {reason}"),
            citations: Vec::new(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.summary.starts_with("error:")
    }

    /// Enforces the missing-citation invariant in place: a non-error summary
    /// with no citations is rewritten to `summary="error: missing-citation"`.
    pub fn enforce_citation_invariant(&mut self) {
        if !self.is_error() && self.citations.is_empty() {
            self.summary = "error: missing-citation".to_string();
        }
    }
}

/// A highlighted region of a file surfaced by the `discover` stage.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Region {
    pub start_line: u32,
    pub end_line: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Highlight {
    pub path: String,
    pub region: Region,
    pub why: String,
}

/// A validated response from a `discover` stage task: 1-3 highlights.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DiscoverEvidence {
    pub highlights: Vec<Highlight>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DiscoverObservation {
    pub schema_version: u32,
    pub stage: String,
    pub evidence: DiscoverEvidence,
}

impl DiscoverObservation {
    /// Truncates `highlights` to at most three entries, per spec.md §4.3.
    pub fn new(mut highlights: Vec<Highlight>) -> Self {
        highlights.truncate(3);
        Self {
            schema_version: 1,
            stage: "discover".to_string(),
            evidence: DiscoverEvidence { highlights },
        }
    }

    pub fn is_valid(&self) -> bool {
        self.schema_version == 1
            && self.stage == "discover"
            && !self.evidence.highlights.is_empty()
            && self.evidence.highlights.len() <= 3
    }
}
