//! End-to-end outcome tests through the simulated test runner.

use fieldtest_core::{FnValidation, ValidationSequence, ValidationSequenceSet, ValidationStatus, ValidationVerdict};
use fieldtest_env::{Display, SignalDisplay, WorldSnapshot};
use fieldtest_sim::scenarios::ScenarioId;
use fieldtest_sim::{
    FaultPlan, OutcomeKind, ScenarioRunner, SimulatedField, SimulatedTestRunner, TestConfig, TestError, TestOutcome,
    TestRun,
};
use proptest::prelude::*;
use std::time::{Duration, Instant};

fn config(timeout_ms: u64, tick_ms: u64) -> TestConfig {
    TestConfig::default()
        .with_timeout(Duration::from_millis(timeout_ms))
        .with_tick_duration(Duration::from_millis(tick_ms))
        .with_close_delays(Duration::ZERO, Duration::from_millis(20))
}

/// Passes once the snapshot tick reaches `tick`.
fn passes_from(name: &str, tick: u64) -> ValidationSequenceSet {
    ValidationSequenceSet::new().with(ValidationSequence::new(name).then(FnValidation::new(
        name,
        move |w: &WorldSnapshot| {
            if w.tick >= tick {
                ValidationVerdict::passed()
            } else {
                ValidationVerdict::pending()
            }
        },
    )))
}

/// Holds until the snapshot tick reaches `tick`, then fails.
fn fails_at(name: &str, tick: u64) -> ValidationSequenceSet {
    ValidationSequenceSet::new().with(ValidationSequence::new(name).then(FnValidation::new(
        name,
        move |w: &WorldSnapshot| {
            if w.tick >= tick {
                ValidationVerdict::failed(format!("violated at tick {}", w.tick))
            } else {
                ValidationVerdict::pending()
            }
        },
    )))
}

fn run(
    config: TestConfig,
    faults: FaultPlan,
    always: ValidationSequenceSet,
    eventually: ValidationSequenceSet,
) -> TestRun {
    SimulatedTestRunner::new(config).run_test(SimulatedField::new(1), faults, always, eventually, Vec::new())
}

#[test]
fn test_eventually_passes_after_full_timeout() {
    let result = run(
        config(3000, 50),
        FaultPlan::none(),
        ValidationSequenceSet::new(),
        passes_from("reaches_goal", 10),
    );

    assert_eq!(result.outcome, TestOutcome::Passed);
    assert_eq!(result.ticks, 60);
    assert_eq!(result.elapsed, Duration::from_secs(3));
}

#[test]
fn test_always_violation_stops_at_tick() {
    let result = run(
        config(3000, 50),
        FaultPlan::none(),
        fails_at("stays_on_field", 5),
        ValidationSequenceSet::new(),
    );

    let TestOutcome::FailedAlways(detail) = &result.outcome else {
        panic!("unexpected outcome {:?}", result.outcome);
    };
    assert_eq!(detail.tick, 5);
    assert_eq!(result.ticks, 5);
    // The field never served a sixth tick
    assert_eq!(result.server.map(|s| s.ticks_served), Some(5));
}

#[test]
fn test_eventually_timeout_lists_pending_sequence() {
    let result = run(
        config(1000, 50),
        FaultPlan::none(),
        ValidationSequenceSet::new(),
        passes_from("never", u64::MAX),
    );

    let TestOutcome::FailedEventuallyTimeout(detail) = &result.outcome else {
        panic!("unexpected outcome {:?}", result.outcome);
    };
    assert_eq!(result.ticks, 20);
    assert_eq!(detail.sequences.len(), 1);
    assert_eq!(detail.sequences[0].sequence, "never");
    assert_eq!(detail.sequences[0].status, ValidationStatus::Pending);
}

#[test]
fn test_transport_drop_is_an_exception() {
    let result = run(
        config(1000, 50),
        FaultPlan::drop_after(4),
        ValidationSequenceSet::new(),
        ValidationSequenceSet::new(),
    );

    assert!(result.outcome.transport_error().is_some(), "{:?}", result.outcome);
    // Four snapshots served, the fifth tick found the channel closed
    assert_eq!(result.ticks, 5);
}

#[test]
fn test_transport_drop_closes_display_within_grace() {
    let display = SignalDisplay::new();
    let signal = display.close_signal();

    let mut config = config(1000, 50);
    config.visualization_enabled = true;
    let mut runner = SimulatedTestRunner::new(config).with_display(display);

    let start = Instant::now();
    let result = runner.run_test(
        SimulatedField::new(1),
        FaultPlan::drop_after(4),
        ValidationSequenceSet::new(),
        ValidationSequenceSet::new(),
        Vec::new(),
    );

    assert!(matches!(result.outcome, TestOutcome::FailedException(TestError::Transport(_))));
    assert!(signal.is_closed());
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_headless_and_visualized_agree() {
    for (always, eventually) in [(3, u64::MAX), (u64::MAX, 4), (u64::MAX, u64::MAX)] {
        let headless = run(
            config(500, 50),
            FaultPlan::none(),
            fails_at("always", always),
            passes_from("eventually", eventually),
        );

        let mut visual_config = config(500, 50);
        visual_config.visualization_enabled = true;
        let visual = SimulatedTestRunner::new(visual_config)
            .with_display(SignalDisplay::new())
            .run_test(
                SimulatedField::new(1),
                FaultPlan::none(),
                fails_at("always", always),
                passes_from("eventually", eventually),
                Vec::new(),
            );

        assert_eq!(headless.outcome, visual.outcome);
        assert_eq!(headless.ticks, visual.ticks);
    }
}

#[test]
fn test_builtin_scenarios_match_expectations() {
    let config = TestConfig::default().with_close_delays(Duration::ZERO, Duration::ZERO);

    for seed in [1, 42] {
        let runner = ScenarioRunner::new(seed, config.clone());
        for scenario in ScenarioId::all() {
            let result = runner.run(scenario);
            assert!(result.passed, "{} seed={}: {:?}", scenario, seed, result.failure_reason);
        }
    }
}

#[test]
fn test_early_exit_stops_when_all_pass() {
    let config = config(3000, 50).with_early_exit(true);
    let result = run(config, FaultPlan::none(), ValidationSequenceSet::new(), passes_from("quick", 7));

    assert_eq!(result.outcome.kind(), OutcomeKind::Passed);
    assert_eq!(result.ticks, 7);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_always_failure_at_k_runs_k_ticks(k in 1u64..=20) {
        let result = run(
            config(1500, 50),
            FaultPlan::none(),
            fails_at("guard", k),
            ValidationSequenceSet::new(),
        );

        prop_assert_eq!(result.outcome.kind(), OutcomeKind::FailedAlways);
        prop_assert_eq!(result.outcome.failure_tick(), Some(k));
        prop_assert_eq!(result.ticks, k);
    }
}
