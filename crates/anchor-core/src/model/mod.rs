mod condition;
mod finding;
mod observation;
mod persist;

pub use condition::{Condition, ConditionState};
pub use finding::{
    Finding, FindingStatus, Provenance, SeedEvidence, SeedSource, TasksLogEntry, Verdict,
    VerdictState,
};
pub use observation::{
    Citation, DiscoverEvidence, DiscoverObservation, ExecObservation, Highlight, Region,
};
pub use persist::{finding_path, read_finding, write_finding};
