use crate::grammar::Lens;

/// Which pipeline stage a prompt is being built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Discover,
    Exec,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Discover => "discover",
            Stage::Exec => "exec",
        }
    }
}

const SYSTEM_BANNER: &str = "You are a deterministic security auditor. No network. No writes. \
JSON only. You are one stage in a fixed pipeline; your JSON is consumed verbatim by the next stage.";

/// The fixed system-role text shared by every stage (spec.md §4.3 step 2).
/// Identical boilerplate across discover/exec, parameterized only by the
/// stage name, so a reader diffing two prompts sees exactly one changed line.
pub fn system_banner(stage: Stage) -> String {
    format!("{SYSTEM_BANNER}\nstage: {}", stage.as_str())
}

/// Builds the full discover-stage prompt for `path`.
pub fn discover_prompt(path: &str, lens: Option<Lens>) -> String {
    let lens_line = match lens {
        Some(lens) => format!("lens hint: {}\n", lens.as_str()),
        None => String::new(),
    };
    format!(
        "{banner}\n\n\
         user:\n\
         path: {path}\n\
         {lens_line}\
         task: identify 1-3 highlight regions in this file worth deeper investigation.\n\
         respond with JSON: {{schema_version: 1, stage: \"discover\", evidence: {{highlights: \
         [{{path, region: {{start_line, end_line}}, why}}]}}}}",
        banner = system_banner(Stage::Discover),
    )
}

/// Builds the full exec-stage prompt for `path` and the free-form `goal`.
pub fn exec_prompt(path: &str, goal: &str) -> String {
    format!(
        "{banner}\n\n\
         user:\n\
         path: {path}\n\
         goal: {goal}\n\
         task: gather direct evidence for or against this goal, citing exact line ranges.\n\
         respond with JSON: {{schema_version: 1, stage: \"exec\", summary, \
         citations: [{{path, start_line, end_line, sha1}}], notes}}",
        banner = system_banner(Stage::Exec),
    )
}
