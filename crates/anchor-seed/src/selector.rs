use std::path::Path;

use anchor_core::model::SeedSource;
use tracing::warn;

use crate::diff::changed_paths;
use crate::error::SeedError;
use crate::hotspots::{self, Category};
use crate::lens::{self, Lens};
use crate::manifest::read_manifest;

/// One entry in the final, ordered, de-duplicated seed list (spec.md §4.5).
#[derive(Clone, Debug, PartialEq)]
pub struct SeedEntry {
    pub path: String,
    pub lens: Vec<Lens>,
    pub source: SeedSource,
}

/// Parameters controlling seed selection, resolved from CLI flags and
/// `ANCHOR_*` environment variables by the caller.
pub struct SelectorConfig<'a> {
    pub manifest_path: &'a Path,
    pub repo_root: &'a Path,
    pub git_since: Option<&'a str>,
    pub git_window_days: Option<u32>,
    pub hotspots_enabled: bool,
    pub hotspot_categories: &'a [Category],
    pub auto_lens_enabled: bool,
}

/// Builds the ordered seed list: diffed files first (they override stale
/// ordering), then manifest entries in file order, then hotspots sorted by
/// descending score; duplicates collapse to their first occurrence, which
/// also fixes the recorded `source` (spec.md §4.5 step 5).
pub fn select_seeds(config: &SelectorConfig) -> Result<Vec<SeedEntry>, SeedError> {
    let diffed = match changed_paths(config.repo_root, config.git_since, config.git_window_days) {
        Ok(paths) => paths,
        Err(err) => {
            warn!(error = %err, "git diff scan unavailable, continuing without it");
            Vec::new()
        }
    };

    let manifest_entries = read_manifest(config.manifest_path, config.repo_root)?;

    let hotspot_hits = if config.hotspots_enabled {
        hotspots::scan(config.repo_root, config.hotspot_categories)?
    } else {
        Vec::new()
    };

    let mut ordered: Vec<(String, SeedSource)> = Vec::new();
    for path in diffed {
        ordered.push((path, SeedSource::Diff));
    }
    for path in manifest_entries {
        ordered.push((path, SeedSource::Manual));
    }
    for hit in hotspot_hits {
        ordered.push((hit.path, SeedSource::Hotspot));
    }

    let mut seen = std::collections::HashSet::new();
    let mut deduped = Vec::new();
    for (path, source) in ordered {
        if seen.insert(path.clone()) {
            deduped.push((path, source));
        }
    }

    let entries = deduped
        .into_iter()
        .map(|(path, source)| {
            let lens = if config.auto_lens_enabled {
                lens::assign(config.repo_root, &path)
            } else {
                Vec::new()
            };
            SeedEntry { path, lens, source }
        })
        .collect();

    Ok(entries)
}
