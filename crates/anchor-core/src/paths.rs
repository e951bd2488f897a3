use std::path::{Component, Path, PathBuf};

use crate::error::CoreError;

/// Resolves `candidate` against `root` and returns its repository-relative,
/// forward-slash-normalized form. Fails with [`CoreError::PathEscape`] if the
/// lexically-resolved path is not a descendant of `root`.
///
/// Resolution is purely lexical (no filesystem access, so this also rejects
/// paths to files that do not exist yet): `..` components are applied against
/// the accumulated path rather than followed through symlinks. This is
/// intentional — manifest entries, Codex citation paths, and LLM-produced
/// file names must all be checked before any file is touched.
pub fn repo_rel(root: &Path, candidate: &Path) -> Result<String, CoreError> {
    let absolute_candidate = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };

    let normalized = lexically_normalize(&absolute_candidate);
    let normalized_root = lexically_normalize(root);

    let relative = normalized
        .strip_prefix(&normalized_root)
        .map_err(|_| CoreError::PathEscape {
            path: candidate.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    // `strip_prefix` of an identical path returns `""`; that's the repo root
    // itself, not a traversal, but callers resolving *files* should reject it
    // upstream if an empty relative path is meaningless for them.
    let rel_str = relative
        .to_str()
        .ok_or_else(|| CoreError::NonUtf8Path {
            path: candidate.to_path_buf(),
        })?;

    Ok(rel_str.replace(std::path::MAIN_SEPARATOR, "/"))
}

/// Lexically collapses `.`/`..`/redundant separators without touching the
/// filesystem. A leading `..` that would escape the path's own root is kept
/// (it will then fail the `strip_prefix` check in [`repo_rel`]).
fn lexically_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_descendant() {
        let root = Path::new("/repo");
        assert_eq!(repo_rel(root, Path::new("src/main.rs")).unwrap(), "src/main.rs");
    }

    #[test]
    fn accepts_absolute_descendant() {
        let root = Path::new("/repo");
        assert_eq!(
            repo_rel(root, Path::new("/repo/src/main.rs")).unwrap(),
            "src/main.rs"
        );
    }

    #[test]
    fn rejects_parent_traversal() {
        let root = Path::new("/repo");
        assert!(matches!(
            repo_rel(root, Path::new("../etc/passwd")),
            Err(CoreError::PathEscape { .. })
        ));
    }

    #[test]
    fn rejects_absolute_escape() {
        let root = Path::new("/repo");
        assert!(matches!(
            repo_rel(root, Path::new("/etc/passwd")),
            Err(CoreError::PathEscape { .. })
        ));
    }

    #[test]
    fn collapses_internal_dot_dot_that_stays_inside_root() {
        let root = Path::new("/repo");
        assert_eq!(
            repo_rel(root, Path::new("src/../src/main.rs")).unwrap(),
            "src/main.rs"
        );
    }

    #[test]
    fn normalizes_to_forward_slashes() {
        let root = Path::new("/repo");
        let rel = repo_rel(root, Path::new("a/b/c.py")).unwrap();
        assert!(!rel.contains('\\'));
        assert_eq!(rel, "a/b/c.py");
    }
}
