use std::str::FromStr;

use crate::error::AgentError;

/// Coarse taxonomy hint attached to a `discover` task (spec.md §4.3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lens {
    Exec,
    Path,
    Deser,
    Authz,
    Ssrf,
    Template,
    Crypto,
    Xxe,
    Sql,
    Ssh,
    CloudIam,
}

impl Lens {
    pub fn as_str(self) -> &'static str {
        match self {
            Lens::Exec => "exec",
            Lens::Path => "path",
            Lens::Deser => "deser",
            Lens::Authz => "authz",
            Lens::Ssrf => "ssrf",
            Lens::Template => "template",
            Lens::Crypto => "crypto",
            Lens::Xxe => "xxe",
            Lens::Sql => "sql",
            Lens::Ssh => "ssh",
            Lens::CloudIam => "cloud-iam",
        }
    }
}

impl FromStr for Lens {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exec" => Ok(Lens::Exec),
            "path" => Ok(Lens::Path),
            "deser" => Ok(Lens::Deser),
            "authz" => Ok(Lens::Authz),
            "ssrf" => Ok(Lens::Ssrf),
            "template" => Ok(Lens::Template),
            "crypto" => Ok(Lens::Crypto),
            "xxe" => Ok(Lens::Xxe),
            "sql" => Ok(Lens::Sql),
            "ssh" => Ok(Lens::Ssh),
            "cloud-iam" => Ok(Lens::CloudIam),
            other => Err(AgentError::MalformedTask(format!("unknown lens `{other}`"))),
        }
    }
}

/// The only task shapes the engine is permitted to produce (spec.md §4.3).
/// The agent is the sole consumer of this grammar; the engine never
/// constructs a Codex prompt directly.
#[derive(Clone, Debug, PartialEq)]
pub enum Task {
    Discover { path: String, lens: Option<Lens> },
    Exec { path: String, goal: String },
}

impl FromStr for Task {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix("codex:discover:") {
            let mut parts = rest.splitn(2, "::");
            let path = parts
                .next()
                .filter(|p| !p.is_empty())
                .ok_or_else(|| AgentError::MalformedTask(s.to_string()))?;
            let lens = match parts.next() {
                Some(lens_str) => Some(lens_str.parse()?),
                None => None,
            };
            return Ok(Task::Discover {
                path: path.to_string(),
                lens,
            });
        }

        if let Some(rest) = s.strip_prefix("codex:exec:") {
            let mut parts = rest.splitn(2, "::");
            let path = parts
                .next()
                .filter(|p| !p.is_empty())
                .ok_or_else(|| AgentError::MalformedTask(s.to_string()))?;
            let goal = parts
                .next()
                .filter(|g| !g.is_empty())
                .ok_or_else(|| AgentError::MalformedTask(s.to_string()))?;
            return Ok(Task::Exec {
                path: path.to_string(),
                goal: goal.to_string(),
            });
        }

        Err(AgentError::MalformedTask(s.to_string()))
    }
}
