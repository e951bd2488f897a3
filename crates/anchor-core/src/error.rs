use std::path::PathBuf;

use thiserror::Error;

/// Errors shared by path resolution and atomic persistence, the two leaf
/// utilities every other Anchor crate builds on.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("path `{path}` resolves outside repository root `{root}`")]
    PathEscape { path: PathBuf, root: PathBuf },
    #[error("path `{path}` is not valid UTF-8")]
    NonUtf8Path { path: PathBuf },
    #[error("failed to create parent directory `{path}`: {source}")]
    CreateParentDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write temp file `{path}`: {source}")]
    WriteTemp {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to rename `{from}` to `{to}`: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON at `{path}`: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
