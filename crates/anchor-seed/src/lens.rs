use std::collections::HashSet;
use std::path::Path;

/// Risk lens assigned to a seeded file, extending
/// `original_source/util/imports.py`'s `MODULE_LENS_MAP`/`LENS_ORDER` to the
/// fuller vocabulary spec.md §4.5 names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lens {
    Ssrf,
    Template,
    Crypto,
    Xxe,
    Sql,
    CloudIam,
    Exec,
    Path,
    Deser,
    Authz,
    Ssh,
}

impl Lens {
    pub fn as_str(self) -> &'static str {
        match self {
            Lens::Ssrf => "ssrf",
            Lens::Template => "template",
            Lens::Crypto => "crypto",
            Lens::Xxe => "xxe",
            Lens::Sql => "sql",
            Lens::CloudIam => "cloud-iam",
            Lens::Exec => "exec",
            Lens::Path => "path",
            Lens::Deser => "deser",
            Lens::Authz => "authz",
            Lens::Ssh => "ssh",
        }
    }
}

/// Fixed priority order for collapsing a file's candidate lenses to at
/// most two (spec.md §4.5 step 4).
const PRIORITY: [Lens; 11] = [
    Lens::Ssrf,
    Lens::Template,
    Lens::Crypto,
    Lens::Xxe,
    Lens::Sql,
    Lens::CloudIam,
    Lens::Exec,
    Lens::Path,
    Lens::Deser,
    Lens::Authz,
    Lens::Ssh,
];

fn module_lens(module: &str) -> Option<Lens> {
    match module {
        "requests" | "urllib" | "urllib2" | "httpx" | "aiohttp" => Some(Lens::Ssrf),
        "jinja2" | "mako" | "django" => Some(Lens::Template),
        "hashlib" | "cryptography" | "Crypto" | "nacl" => Some(Lens::Crypto),
        "lxml" | "xml" => Some(Lens::Xxe),
        "sqlalchemy" | "psycopg2" | "sqlite3" | "pymysql" | "mysql" => Some(Lens::Sql),
        "boto3" | "google" | "azure" => Some(Lens::CloudIam),
        "subprocess" | "os" | "shlex" => Some(Lens::Exec),
        "tarfile" | "zipfile" | "shutil" => Some(Lens::Path),
        "pickle" | "yaml" | "toml" | "marshal" => Some(Lens::Deser),
        "flask" | "fastapi" => Some(Lens::Authz),
        "paramiko" | "fabric" => Some(Lens::Ssh),
        _ => None,
    }
}

fn walk_imports(code: &str) -> HashSet<String> {
    let mut modules = HashSet::new();
    for line in code.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("import ") {
            if let Some(name) = rest.split([',', ' ', '.']).next() {
                if !name.is_empty() {
                    modules.insert(name.to_string());
                }
            }
        } else if let Some(rest) = line.strip_prefix("from ") {
            if let Some(name) = rest.split([' ', '.']).next() {
                if !name.is_empty() {
                    modules.insert(name.to_string());
                }
            }
        }
    }
    modules
}

fn deps_from_requirements(repo_root: &Path) -> HashSet<String> {
    let mut deps = HashSet::new();
    if let Ok(entries) = std::fs::read_dir(repo_root) {
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with("requirements") && name.ends_with(".txt") {
                if let Ok(text) = std::fs::read_to_string(entry.path()) {
                    for line in text.lines() {
                        let line = line.trim();
                        if line.is_empty() || line.starts_with('#') {
                            continue;
                        }
                        if let Some(name) = line.split(['=', '<', '>', '[']).next() {
                            deps.insert(name.trim().to_string());
                        }
                    }
                }
            }
        }
    }

    let pyproject = repo_root.join("pyproject.toml");
    if let Ok(text) = std::fs::read_to_string(pyproject) {
        if let Ok(value) = text.parse::<toml::Value>() {
            if let Some(list) = value
                .get("project")
                .and_then(|p| p.get("dependencies"))
                .and_then(|d| d.as_array())
            {
                for dep in list {
                    if let Some(dep) = dep.as_str() {
                        if let Some(name) = dep.split(['=', '<', '>', '[']).next() {
                            deps.insert(name.trim().to_string());
                        }
                    }
                }
            }
        }
    }

    deps
}

/// Assigns up to two lenses to the file at `repo_root`/`rel_path`,
/// preferring module-local imports over project-wide dependencies
/// (spec.md §4.5 step 4).
pub fn assign(repo_root: &Path, rel_path: &str) -> Vec<Lens> {
    let full_path = repo_root.join(rel_path);
    let code = std::fs::read_to_string(&full_path).unwrap_or_default();
    let local_modules = walk_imports(&code);
    let local_lenses: HashSet<Lens> = local_modules.iter().filter_map(|m| module_lens(m)).collect();

    let global_modules = deps_from_requirements(repo_root);
    let global_lenses: HashSet<Lens> = global_modules.iter().filter_map(|m| module_lens(m)).collect();

    let mut chosen = Vec::new();
    for lens in PRIORITY {
        if local_lenses.contains(&lens) && !chosen.contains(&lens) {
            chosen.push(lens);
        }
        if chosen.len() == 2 {
            return chosen;
        }
    }
    for lens in PRIORITY {
        if global_lenses.contains(&lens) && !chosen.contains(&lens) {
            chosen.push(lens);
        }
        if chosen.len() == 2 {
            break;
        }
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_exec_lens_from_subprocess_import() {
        let repo = tempfile::tempdir().unwrap();
        std::fs::write(repo.path().join("a.py"), b"import subprocess\n").unwrap();
        let lenses = assign(repo.path(), "a.py");
        assert_eq!(lenses, vec![Lens::Exec]);
    }

    #[test]
    fn prefers_module_local_over_global_dependency() {
        let repo = tempfile::tempdir().unwrap();
        std::fs::write(repo.path().join("a.py"), b"import subprocess\n").unwrap();
        std::fs::write(repo.path().join("requirements.txt"), b"requests==2.0\n").unwrap();
        let lenses = assign(repo.path(), "a.py");
        assert_eq!(lenses[0], Lens::Exec);
    }

    #[test]
    fn caps_at_two_lenses() {
        let repo = tempfile::tempdir().unwrap();
        std::fs::write(
            repo.path().join("a.py"),
            b"import subprocess\nimport pickle\nimport paramiko\n",
        )
        .unwrap();
        let lenses = assign(repo.path(), "a.py");
        assert_eq!(lenses.len(), 2);
    }
}
