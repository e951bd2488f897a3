use thiserror::Error;

/// Errors raised while building the seed list. Every variant here is fatal
/// before a run directory is even created (spec.md §7 `ManifestError`).
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("manifest entry `{path}` does not exist under the repository root")]
    MissingFile { path: String },
    #[error("manifest contains duplicate entry `{path}`")]
    DuplicateEntry { path: String },
    #[error(transparent)]
    Path(#[from] anchor_core::CoreError),
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse pyproject.toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("git diff invocation failed: {0}")]
    GitDiff(String),
}
