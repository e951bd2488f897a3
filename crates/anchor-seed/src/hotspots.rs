use std::path::Path;

use anchor_core::paths::repo_rel;
use regex::Regex;
use walkdir::WalkDir;

use crate::error::SeedError;

/// Hotspot category, weighted per spec.md §9 Open Question (resolved in
/// SPEC_FULL.md §5.5), extending `original_source/util/hotspots.py`'s
/// sink/entry pattern lists into the full category table spec.md §4.5 names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Network,
    Subprocess,
    Filesystem,
    Serialization,
    Crypto,
    Template,
    Config,
    Server,
    Archive,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Network => "network",
            Category::Subprocess => "subprocess",
            Category::Filesystem => "filesystem",
            Category::Serialization => "serialization",
            Category::Crypto => "crypto",
            Category::Template => "template",
            Category::Config => "config",
            Category::Server => "server",
            Category::Archive => "archive",
        }
    }

    pub fn weight(self) -> u32 {
        match self {
            Category::Network => 5,
            Category::Subprocess => 5,
            Category::Filesystem => 3,
            Category::Serialization => 4,
            Category::Crypto => 3,
            Category::Template => 3,
            Category::Config => 2,
            Category::Server => 2,
            Category::Archive => 3,
        }
    }

    pub const ALL: [Category; 9] = [
        Category::Network,
        Category::Subprocess,
        Category::Filesystem,
        Category::Serialization,
        Category::Crypto,
        Category::Template,
        Category::Config,
        Category::Server,
        Category::Archive,
    ];

    pub fn parse(name: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.as_str().eq_ignore_ascii_case(name))
    }

    fn patterns(self) -> &'static [&'static str] {
        match self {
            Category::Network => &[
                r"\brequests\.",
                r"\burllib\.",
                r"\bsocket\.",
                r"\bhttp\.client",
                r"\baiohttp\.",
            ],
            Category::Subprocess => &[r"\bsubprocess\.", r"\bos\.system\(", r"\bos\.popen\("],
            Category::Filesystem => &[r"\bshutil\.", r"\bos\.remove\(", r"\bpathlib\.Path\("],
            Category::Serialization => &[
                r"\bpickle\.loads?\(",
                r"\byaml\.load\(",
                r"\bmarshal\.loads\(",
            ],
            Category::Crypto => &[r"\bhashlib\.", r"\bCrypto\.", r"\bcryptography\."],
            Category::Template => &[r"\bjinja2\.", r"\bTemplate\(", r"render_template_string\("],
            Category::Config => &[r"\bconfigparser\.", r"os\.environ\[", r"\bdotenv\."],
            Category::Server => &[r"@app\.route", r"\bFastAPI\(", r"http\.server"],
            Category::Archive => &[r"\btarfile\.open\(", r"\bzipfile\.ZipFile\("],
        }
    }
}

/// A scored hotspot hit: `score = weight(category) + #matches`.
#[derive(Clone, Debug, PartialEq)]
pub struct Hotspot {
    pub path: String,
    pub category: Category,
    pub score: u32,
}

/// Scans every `*.py` file under `repo_root` against the category pattern
/// table, returning hits sorted by descending score (spec.md §4.5 step 2).
/// `categories`, if non-empty, restricts the scan to those categories.
pub fn scan(repo_root: &Path, categories: &[Category]) -> Result<Vec<Hotspot>, SeedError> {
    let active: Vec<Category> = if categories.is_empty() {
        Category::ALL.to_vec()
    } else {
        categories.to_vec()
    };

    let compiled: Vec<(Category, Vec<Regex>)> = active
        .into_iter()
        .map(|category| {
            let patterns = category
                .patterns()
                .iter()
                .map(|p| Regex::new(p).expect("hotspot pattern is a valid regex"))
                .collect();
            (category, patterns)
        })
        .collect();

    let mut hotspots = Vec::new();

    for entry in WalkDir::new(repo_root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|ext| ext.to_str()) == Some("py"))
    {
        let Ok(text) = std::fs::read_to_string(entry.path()) else {
            continue;
        };
        let rel = repo_rel(repo_root, entry.path())?;

        for (category, patterns) in &compiled {
            let matches: usize = patterns.iter().map(|p| p.find_iter(&text).count()).sum();
            if matches > 0 {
                hotspots.push(Hotspot {
                    path: rel.clone(),
                    category: *category,
                    score: category.weight() + matches as u32,
                });
            }
        }
    }

    hotspots.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.path.cmp(&b.path)));
    Ok(hotspots)
}
