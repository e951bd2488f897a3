use anchor_core::model::Finding;

/// Finalizes `finding`'s verdict from its top-level conditions' terminal
/// states. Thin wrapper kept at the engine boundary so `pipeline.rs` never
/// reaches into `anchor_core` directly for this step (spec.md §4.6
/// "Finding-level verdict").
pub fn finalize(finding: &mut Finding) {
    finding.finalize_verdict();
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_core::model::{ConditionState, Provenance, SeedEvidence, SeedSource, VerdictState};

    fn finding() -> Finding {
        Finding::new(
            "claim",
            vec!["a.py".into()],
            SeedEvidence { highlights: vec![] },
            SeedSource::Manual,
            Provenance {
                run_id: "r1".into(),
                created_at: "1970-01-01T00:00:00Z".into(),
                input_hash: "h".into(),
                file_size: 1,
                path: "a.py".into(),
            },
            "0.1.0",
        )
    }

    #[test]
    fn finalize_sets_verdict_on_finding() {
        let mut f = finding();
        f.conditions = vec![{
            let mut c = anchor_core::model::Condition::new("d", "w", "a", "r", vec![]);
            c.state = ConditionState::Satisfied;
            c
        }];
        finalize(&mut f);
        assert_eq!(f.verdict.unwrap().state, VerdictState::TruePositive);
    }
}
