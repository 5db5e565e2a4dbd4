//! Validation Module - Temporal Predicates over World Snapshots
//! =============================================================
//!
//! A test is described by two sets of validation sequences:
//!
//! - **always**: must never report `Failed` on any tick
//! - **eventually**: must all report `Passed` by the end of the run
//!
//! Each sequence is an ordered list of predicates. Only the active predicate
//! is evaluated on a tick; when it passes, the sequence moves on and the next
//! predicate is first evaluated on the following tick.
//!
//! Usage:
//! ```ignore
//! use fieldtest_core::{ValidationSequence, ValidationSequenceSet, RobotEntersRegion};
//!
//! let eventually = ValidationSequenceSet::new().with(
//!     ValidationSequence::new("robot reaches centre")
//!         .then(RobotEntersRegion::new(Team::Blue, 0, Region::circle(centre, 0.5))),
//! );
//! ```

use fieldtest_env::WorldSnapshot;
use serde::{Deserialize, Serialize};

// =============================================================================
// VERDICTS
// =============================================================================

/// State of a predicate or sequence on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationStatus {
    Pending,
    Passed,
    Failed,
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationStatus::Pending => write!(f, "pending"),
            ValidationStatus::Passed => write!(f, "passed"),
            ValidationStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Result of evaluating one predicate against one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationVerdict {
    pub status: ValidationStatus,

    /// Optional human-readable diagnostic
    pub detail: Option<String>,
}

impl ValidationVerdict {
    pub fn pending() -> Self {
        Self { status: ValidationStatus::Pending, detail: None }
    }

    pub fn passed() -> Self {
        Self { status: ValidationStatus::Passed, detail: None }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            status: ValidationStatus::Failed,
            detail: Some(detail.into()),
        }
    }

    /// Attaches a diagnostic to this verdict.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Which temporal rule a report is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationType {
    Always,
    Eventually,
}

impl std::fmt::Display for ValidationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationType::Always => write!(f, "always"),
            ValidationType::Eventually => write!(f, "eventually"),
        }
    }
}

// =============================================================================
// PREDICATES
// =============================================================================

/// A predicate over a world snapshot.
///
/// Implementations must not depend on anything but the snapshot: evaluating
/// the same snapshot twice gives the same verdict. Conditions that must hold
/// continuously report `Pending` while they hold and `Failed` once violated;
/// reporting `Passed` would let the sequence move past them.
pub trait Validation: Send {
    fn validate(&self, world: &WorldSnapshot) -> ValidationVerdict;

    /// Name shown in reports and failure diagnostics.
    fn name(&self) -> String;
}

/// Predicate built from a closure.
pub struct FnValidation<F> {
    name: String,
    check: F,
}

impl<F> FnValidation<F>
where
    F: Fn(&WorldSnapshot) -> ValidationVerdict + Send,
{
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

impl<F> Validation for FnValidation<F>
where
    F: Fn(&WorldSnapshot) -> ValidationVerdict + Send,
{
    fn validate(&self, world: &WorldSnapshot) -> ValidationVerdict {
        (self.check)(world)
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

// =============================================================================
// SEQUENCES
// =============================================================================

/// Verdict of one sequence on one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceReport {
    /// Sequence name
    pub sequence: String,

    pub status: ValidationStatus,

    /// Predicate that produced the status (`None` once the sequence passed)
    pub predicate: Option<String>,

    /// Number of predicates already passed
    pub completed: usize,

    /// Total number of predicates in the sequence
    pub total: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl std::fmt::Display for SequenceReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' {}", self.sequence, self.status)?;
        if let Some(predicate) = &self.predicate {
            write!(f, " at '{}' ({}/{})", predicate, self.completed + 1, self.total)?;
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

/// Ordered list of predicates with its own progress.
///
/// Progress lives in the sequence instance: a sequence whose first predicate
/// passed on tick N resumes at its second predicate on tick N+1.
pub struct ValidationSequence {
    name: String,
    validations: Vec<Box<dyn Validation>>,

    /// Index of the active predicate
    cursor: usize,

    /// Tick of the last snapshot consumed and the report it produced
    last: Option<(u64, SequenceReport)>,
}

impl ValidationSequence {
    /// Creates an empty sequence (which passes immediately).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            validations: Vec::new(),
            cursor: 0,
            last: None,
        }
    }

    /// Appends a predicate.
    pub fn then(mut self, validation: impl Validation + 'static) -> Self {
        self.validations.push(Box::new(validation));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.validations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validations.is_empty()
    }

    /// Returns true once every predicate has passed.
    pub fn is_passed(&self) -> bool {
        self.cursor >= self.validations.len()
    }

    /// Evaluates the active predicate against a snapshot.
    ///
    /// Evaluating the snapshot this sequence consumed last returns the same
    /// report without touching progress.
    pub fn evaluate(&mut self, world: &WorldSnapshot) -> SequenceReport {
        if let Some((tick, report)) = &self.last {
            if *tick == world.tick {
                return report.clone();
            }
        }

        let report = self.step(world);
        self.last = Some((world.tick, report.clone()));
        report
    }

    fn step(&mut self, world: &WorldSnapshot) -> SequenceReport {
        let total = self.validations.len();
        let Some(active) = self.validations.get(self.cursor) else {
            return self.report(ValidationStatus::Passed, None, None);
        };

        let verdict = active.validate(world);
        let predicate = active.name();

        match verdict.status {
            ValidationStatus::Passed => {
                self.cursor += 1;
                match self.validations.get(self.cursor) {
                    Some(next) => {
                        let next_name = next.name();
                        self.report(ValidationStatus::Pending, Some(next_name), None)
                    }
                    None => {
                        debug_assert_eq!(self.cursor, total);
                        self.report(ValidationStatus::Passed, None, verdict.detail)
                    }
                }
            }
            status => self.report(status, Some(predicate), verdict.detail),
        }
    }

    fn report(
        &self,
        status: ValidationStatus,
        predicate: Option<String>,
        detail: Option<String>,
    ) -> SequenceReport {
        SequenceReport {
            sequence: self.name.clone(),
            status,
            predicate,
            completed: self.cursor.min(self.validations.len()),
            total: self.validations.len(),
            detail,
        }
    }
}

impl std::fmt::Debug for ValidationSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.validations.iter().map(|v| v.name()).collect();
        f.debug_struct("ValidationSequence")
            .field("name", &self.name)
            .field("validations", &names)
            .field("cursor", &self.cursor)
            .finish()
    }
}

/// Unordered collection of independently evaluated sequences.
#[derive(Debug, Default)]
pub struct ValidationSequenceSet {
    sequences: Vec<ValidationSequence>,
}

impl ValidationSequenceSet {
    /// Creates an empty set (which trivially passes both checks).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sequence.
    pub fn with(mut self, sequence: ValidationSequence) -> Self {
        self.sequences.push(sequence);
        self
    }

    pub fn push(&mut self, sequence: ValidationSequence) {
        self.sequences.push(sequence);
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationSequence> {
        self.sequences.iter()
    }

    /// Evaluates every sequence against the same snapshot.
    pub fn evaluate(&mut self, world: &WorldSnapshot) -> ValidationReport {
        ValidationReport {
            tick: world.tick,
            sequences: self.sequences.iter_mut().map(|s| s.evaluate(world)).collect(),
        }
    }
}

impl FromIterator<ValidationSequence> for ValidationSequenceSet {
    fn from_iter<I: IntoIterator<Item = ValidationSequence>>(iter: I) -> Self {
        Self {
            sequences: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// REPORTS
// =============================================================================

/// Verdicts of every sequence in a set for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Tick of the snapshot the report was computed from
    pub tick: u64,

    pub sequences: Vec<SequenceReport>,
}

impl ValidationReport {
    /// Checks the report against a temporal rule.
    ///
    /// - `Always`: fails if any sequence is `Failed`
    /// - `Eventually`: fails unless every sequence is `Passed`
    pub fn check(&self, validation_type: ValidationType) -> Result<(), FailureDetail> {
        let offending: Vec<SequenceReport> = self
            .sequences
            .iter()
            .filter(|s| match validation_type {
                ValidationType::Always => s.status == ValidationStatus::Failed,
                ValidationType::Eventually => s.status != ValidationStatus::Passed,
            })
            .cloned()
            .collect();

        if offending.is_empty() {
            Ok(())
        } else {
            Err(FailureDetail {
                validation_type,
                tick: self.tick,
                sequences: offending,
            })
        }
    }

    /// Counts sequences with the given status.
    pub fn count(&self, status: ValidationStatus) -> usize {
        self.sequences.iter().filter(|s| s.status == status).count()
    }

    /// Looks up a sequence's verdict by name.
    pub fn status_of(&self, sequence: &str) -> Option<ValidationStatus> {
        self.sequences
            .iter()
            .find(|s| s.sequence == sequence)
            .map(|s| s.status)
    }
}

/// Why a report did not satisfy its temporal rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub validation_type: ValidationType,

    /// Tick at which the check failed
    pub tick: u64,

    /// Offending sequences (failed for always, not passed for eventually)
    pub sequences: Vec<SequenceReport>,
}

impl std::fmt::Display for FailureDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} validation failed at tick {}", self.validation_type, self.tick)?;
        for (i, sequence) in self.sequences.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, sequence)?;
        }
        Ok(())
    }
}

impl std::error::Error for FailureDetail {}

// =============================================================================
// DISPLAY FRAMES
// =============================================================================

/// Everything a display needs to render one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFrame {
    /// Elapsed simulated time in seconds
    pub elapsed_s: f64,

    pub world: WorldSnapshot,
    pub eventually: ValidationReport,
    pub always: ValidationReport,
}

/// Creates the channel that carries frames to a display.
pub fn frame_channel() -> (
    crossbeam::channel::Sender<ValidationFrame>,
    crossbeam::channel::Receiver<ValidationFrame>,
) {
    crossbeam::channel::unbounded()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn world(tick: u64) -> WorldSnapshot {
        WorldSnapshot::empty(tick, tick as f64 * 0.05)
    }

    fn after_tick(name: &str, tick: u64) -> FnValidation<impl Fn(&WorldSnapshot) -> ValidationVerdict + Send> {
        FnValidation::new(name, move |w: &WorldSnapshot| {
            if w.tick >= tick {
                ValidationVerdict::passed()
            } else {
                ValidationVerdict::pending()
            }
        })
    }

    #[test]
    fn test_empty_sequence_passes() {
        let mut sequence = ValidationSequence::new("empty");
        let report = sequence.evaluate(&world(1));

        assert_eq!(report.status, ValidationStatus::Passed);
        assert!(report.predicate.is_none());
    }

    #[test]
    fn test_empty_set_passes_both_checks() {
        let mut set = ValidationSequenceSet::new();
        let report = set.evaluate(&world(1));

        assert!(report.check(ValidationType::Always).is_ok());
        assert!(report.check(ValidationType::Eventually).is_ok());
    }

    #[test]
    fn test_sequence_advances_one_predicate_per_tick() {
        let mut sequence = ValidationSequence::new("two step")
            .then(after_tick("first", 0))
            .then(after_tick("second", 0));

        let report = sequence.evaluate(&world(1));
        assert_eq!(report.status, ValidationStatus::Pending);
        assert_eq!(report.predicate.as_deref(), Some("second"));
        assert_eq!(report.completed, 1);

        let report = sequence.evaluate(&world(2));
        assert_eq!(report.status, ValidationStatus::Passed);
        assert_eq!(report.completed, 2);
    }

    #[test]
    fn test_failed_predicate_fails_sequence() {
        let mut sequence = ValidationSequence::new("fails")
            .then(FnValidation::new("boom", |_: &WorldSnapshot| ValidationVerdict::failed("nope")));

        let report = sequence.evaluate(&world(1));
        assert_eq!(report.status, ValidationStatus::Failed);
        assert_eq!(report.predicate.as_deref(), Some("boom"));
        assert_eq!(report.detail.as_deref(), Some("nope"));
    }

    #[test]
    fn test_same_snapshot_is_idempotent() {
        let mut set = ValidationSequenceSet::new().with(
            ValidationSequence::new("steps")
                .then(after_tick("a", 0))
                .then(after_tick("b", 0))
                .then(after_tick("c", 0)),
        );

        let w = world(1);
        let first = set.evaluate(&w);
        let second = set.evaluate(&w);
        assert_eq!(first, second);

        // Progress resumes on the next tick, not on the repeat
        let third = set.evaluate(&world(2));
        assert_eq!(third.sequences[0].completed, 2);
    }

    #[test]
    fn test_always_check_accepts_pending() {
        let report = ValidationReport {
            tick: 3,
            sequences: vec![SequenceReport {
                sequence: "holds".to_string(),
                status: ValidationStatus::Pending,
                predicate: Some("stay".to_string()),
                completed: 0,
                total: 1,
                detail: None,
            }],
        };

        assert!(report.check(ValidationType::Always).is_ok());

        let failure = report.check(ValidationType::Eventually).unwrap_err();
        assert_eq!(failure.tick, 3);
        assert_eq!(failure.sequences.len(), 1);
        assert!(failure.to_string().contains("eventually validation failed at tick 3"));
    }

    #[test]
    fn test_status_lookup_and_counts() {
        let mut set = ValidationSequenceSet::new()
            .with(ValidationSequence::new("done"))
            .with(ValidationSequence::new("later").then(after_tick("t5", 5)));

        let report = set.evaluate(&world(1));
        assert_eq!(report.status_of("done"), Some(ValidationStatus::Passed));
        assert_eq!(report.status_of("later"), Some(ValidationStatus::Pending));
        assert_eq!(report.count(ValidationStatus::Passed), 1);
        assert_eq!(report.status_of("missing"), None);
    }

    proptest! {
        #[test]
        fn prop_passed_never_regresses(
            pass_ticks in proptest::collection::vec(1u64..40, 1..5),
            flaky_after in 1u64..40,
        ) {
            // Each predicate passes from its tick on, then starts failing
            // after `flaky_after`; a passed sequence must ignore that.
            let mut sequence = ValidationSequence::new("prop");
            for (i, t) in pass_ticks.iter().copied().enumerate() {
                sequence = sequence.then(FnValidation::new(format!("p{}", i), move |w: &WorldSnapshot| {
                    if w.tick >= t && w.tick <= t + flaky_after {
                        ValidationVerdict::passed()
                    } else if w.tick > t + flaky_after {
                        ValidationVerdict::failed("regressed")
                    } else {
                        ValidationVerdict::pending()
                    }
                }));
            }

            let mut seen_passed = false;
            for tick in 1..=100u64 {
                let report = sequence.evaluate(&world(tick));
                if seen_passed {
                    prop_assert_eq!(report.status, ValidationStatus::Passed);
                }
                if report.status == ValidationStatus::Passed {
                    seen_passed = true;
                }
            }
        }
    }
}
