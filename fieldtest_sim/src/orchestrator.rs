//! Test orchestrator - the tick / validate / decide run loop.

use crate::config::validate_timing;
use crate::error::TestError;
use crate::observer::ReportObserver;
use crate::outcome::TestOutcome;
use crate::tick::TickDriver;

use fieldtest_core::{SequenceEngine, ValidationEngine, ValidationSequenceSet, ValidationStatus, ValidationType};
use fieldtest_env::{TickPublisher, WorldSource};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Ticks between debug progress lines.
const PROGRESS_LOG_INTERVAL: u64 = 60;

/// Owns the run loop and the terminal pass/fail/timeout decision.
pub struct TestOrchestrator<P, W, E = SequenceEngine> {
    driver: TickDriver<P, W>,
    engine: E,
    observers: Vec<Box<dyn ReportObserver>>,

    /// Stop once every eventually-sequence has passed
    exit_on_eventually_passed: bool,
}

impl<P: TickPublisher, W: WorldSource> TestOrchestrator<P, W, SequenceEngine> {
    /// Creates an orchestrator using the default validation engine.
    pub fn new(driver: TickDriver<P, W>) -> Self {
        Self {
            driver,
            engine: SequenceEngine,
            observers: Vec::new(),
            exit_on_eventually_passed: false,
        }
    }
}

impl<P, W, E> TestOrchestrator<P, W, E>
where
    P: TickPublisher,
    W: WorldSource,
    E: ValidationEngine,
{
    /// Replaces the validation engine.
    pub fn with_engine<E2: ValidationEngine>(self, engine: E2) -> TestOrchestrator<P, W, E2> {
        TestOrchestrator {
            driver: self.driver,
            engine,
            observers: self.observers,
            exit_on_eventually_passed: self.exit_on_eventually_passed,
        }
    }

    /// Attaches an observer.
    pub fn with_observer(mut self, observer: impl ReportObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Attaches an already boxed observer.
    pub fn add_observer(&mut self, observer: Box<dyn ReportObserver>) {
        self.observers.push(observer);
    }

    /// Enables early exit once all eventually-sequences pass.
    ///
    /// Always-sequences are still checked first on every tick up to the
    /// exit, but are not checked for the rest of the timeout. A run with no
    /// eventually-sequences never exits early.
    pub fn with_early_exit(mut self, enabled: bool) -> Self {
        self.exit_on_eventually_passed = enabled;
        self
    }

    /// Ticks issued so far.
    pub fn ticks(&self) -> u64 {
        self.driver.ticks()
    }

    /// Elapsed simulated time across all runs of this orchestrator.
    pub fn elapsed(&self) -> Duration {
        self.driver.elapsed()
    }

    /// Runs a test until timeout or the first always-violation.
    ///
    /// Every failure, including configuration and transport errors, is
    /// returned as a [`TestOutcome`].
    pub fn run(
        &mut self,
        mut always: ValidationSequenceSet,
        mut eventually: ValidationSequenceSet,
        timeout: Duration,
        tick_duration: Duration,
    ) -> TestOutcome {
        let outcome = match self.run_loop(&mut always, &mut eventually, timeout, tick_duration) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("Run aborted after {} ticks: {}", self.driver.ticks(), err);
                TestOutcome::FailedException(err)
            }
        };

        for observer in &mut self.observers {
            observer.on_finish(&outcome);
        }

        outcome
    }

    fn run_loop(
        &mut self,
        always: &mut ValidationSequenceSet,
        eventually: &mut ValidationSequenceSet,
        timeout: Duration,
        tick_duration: Duration,
    ) -> Result<TestOutcome, TestError> {
        validate_timing(timeout, tick_duration)?;

        info!(
            "Starting run: timeout={:.3}s tick={:.2}ms always={} eventually={}",
            timeout.as_secs_f64(),
            tick_duration.as_secs_f64() * 1000.0,
            always.len(),
            eventually.len()
        );

        let start = self.driver.elapsed();
        let mut elapsed = Duration::ZERO;
        let mut last_eventually = None;

        while elapsed < timeout {
            let world = self.driver.advance(tick_duration)?;
            elapsed = self.driver.elapsed().saturating_sub(start);

            let eventually_report = self.engine.evaluate(eventually, &world);
            let always_report = self.engine.evaluate(always, &world);

            for observer in &mut self.observers {
                observer.on_tick(elapsed, &world, &eventually_report, &always_report);
            }

            if world.tick % PROGRESS_LOG_INTERVAL == 0 {
                debug!(
                    "  t={:.2}s | tick={} | eventually passed {}/{}",
                    elapsed.as_secs_f64(),
                    world.tick,
                    eventually_report.count(ValidationStatus::Passed),
                    eventually_report.sequences.len()
                );
            }

            if let Err(failure) = self.engine.check(&always_report, ValidationType::Always) {
                warn!("✗ {}", failure);
                debug!(
                    "Eventually state at violation: {}/{} passed",
                    eventually_report.count(ValidationStatus::Passed),
                    eventually_report.sequences.len()
                );
                return Ok(TestOutcome::FailedAlways(failure));
            }

            let all_passed = self
                .engine
                .check(&eventually_report, ValidationType::Eventually)
                .is_ok();
            last_eventually = Some(eventually_report);

            if self.exit_on_eventually_passed && !eventually.is_empty() && all_passed {
                info!("All eventually validations passed at tick {}, exiting early", world.tick);
                break;
            }
        }

        let report = last_eventually
            .ok_or_else(|| TestError::config("run ended without issuing a tick"))?;

        match self.engine.check(&report, ValidationType::Eventually) {
            Ok(()) => {
                info!("✓ Run passed after {} ticks ({:.3}s simulated)", report.tick, elapsed.as_secs_f64());
                Ok(TestOutcome::Passed)
            }
            Err(failure) => {
                warn!("✗ {}", failure);
                Ok(TestOutcome::FailedEventuallyTimeout(failure))
            }
        }
    }
}
