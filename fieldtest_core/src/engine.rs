//! Validation engine contract and its default implementation.

use crate::validation::{FailureDetail, ValidationReport, ValidationSequenceSet, ValidationType};
use fieldtest_env::WorldSnapshot;

/// Evaluates sequence sets and applies the always/eventually rules.
///
/// The orchestrator only talks to validations through this trait, so a
/// different evaluation strategy can be swapped in without touching the run
/// loop.
pub trait ValidationEngine: Send {
    /// Evaluates every sequence of `set` against `world`.
    ///
    /// Must not mutate the world; sequence progress is owned by the set.
    fn evaluate(&self, set: &mut ValidationSequenceSet, world: &WorldSnapshot) -> ValidationReport;

    /// Checks a report against a temporal rule.
    fn check(&self, report: &ValidationReport, validation_type: ValidationType) -> Result<(), FailureDetail>;
}

/// Default engine: evaluates the active predicate of each sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceEngine;

impl ValidationEngine for SequenceEngine {
    fn evaluate(&self, set: &mut ValidationSequenceSet, world: &WorldSnapshot) -> ValidationReport {
        set.evaluate(world)
    }

    fn check(&self, report: &ValidationReport, validation_type: ValidationType) -> Result<(), FailureDetail> {
        report.check(validation_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{FnValidation, ValidationSequence, ValidationStatus, ValidationVerdict};

    #[test]
    fn test_engine_is_deterministic_over_histories() {
        let build = || {
            ValidationSequenceSet::new().with(
                ValidationSequence::new("even ticks")
                    .then(FnValidation::new("tick >= 2", |w: &WorldSnapshot| {
                        if w.tick >= 2 {
                            ValidationVerdict::passed()
                        } else {
                            ValidationVerdict::pending()
                        }
                    }))
                    .then(FnValidation::new("tick >= 4", |w: &WorldSnapshot| {
                        if w.tick >= 4 {
                            ValidationVerdict::passed()
                        } else {
                            ValidationVerdict::pending()
                        }
                    })),
            )
        };

        let engine = SequenceEngine;
        let mut a = build();
        let mut b = build();

        for tick in 1..=6 {
            let world = WorldSnapshot::empty(tick, 0.0);
            assert_eq!(engine.evaluate(&mut a, &world), engine.evaluate(&mut b, &world));
        }

        let world = WorldSnapshot::empty(7, 0.0);
        let report = engine.evaluate(&mut a, &world);
        assert_eq!(report.sequences[0].status, ValidationStatus::Passed);
        assert!(engine.check(&report, ValidationType::Eventually).is_ok());
    }
}
