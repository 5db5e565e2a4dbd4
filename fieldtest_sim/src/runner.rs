//! Test runners - wire the field, orchestrator, observers and display.
//!
//! [`SimulatedTestRunner`] is the fixture a test calls: hand it a field and
//! two validation sets, get back a [`TestRun`]. [`ScenarioRunner`] runs the
//! built-in scenarios on top of it and compares outcomes to expectations.

use crate::bridge::ConcurrencyBridge;
use crate::clock::SimClock;
use crate::config::TestConfig;
use crate::error::TestError;
use crate::exporter::{ExportRecorder, RunExport};
use crate::field::SimulatedField;
use crate::observer::ReportObserver;
use crate::orchestrator::TestOrchestrator;
use crate::outcome::{OutcomeKind, TestOutcome};
use crate::scenarios::ScenarioId;
use crate::tick::TickDriver;
use crate::visualizer::RerunObserver;
use crate::world::{FaultPlan, ServerReport, SimWorld};

use fieldtest_core::ValidationSequenceSet;
use fieldtest_env::Display;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, info};

/// Result of one simulated test.
#[derive(Debug, Clone)]
pub struct TestRun {
    pub outcome: TestOutcome,

    /// Ticks issued by the orchestrator
    pub ticks: u64,

    /// Simulated time covered by those ticks
    pub elapsed: Duration,

    /// Field server summary, `None` if it never started or panicked
    pub server: Option<ServerReport>,
}

impl TestRun {
    fn aborted(err: TestError) -> Self {
        error!("Run aborted before the first tick: {}", err);
        Self {
            outcome: err.into(),
            ticks: 0,
            elapsed: Duration::ZERO,
            server: None,
        }
    }
}

/// Test fixture: runs one simulated test per call.
pub struct SimulatedTestRunner {
    config: TestConfig,

    /// Display for the next visualized run
    display: Option<Box<dyn Display>>,
}

impl SimulatedTestRunner {
    pub fn new(config: TestConfig) -> Self {
        Self { config, display: None }
    }

    /// Uses `display` for the next visualized run instead of the default.
    pub fn with_display(mut self, display: impl Display + 'static) -> Self {
        self.display = Some(Box::new(display));
        self
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    /// Runs one test against `field`.
    ///
    /// The field is served on its own thread and stops once the run ends.
    /// With visualization enabled the orchestrator runs in the background
    /// while the display owns the calling thread.
    pub fn run_test(
        &mut self,
        field: SimulatedField,
        faults: FaultPlan,
        always: ValidationSequenceSet,
        eventually: ValidationSequenceSet,
        observers: Vec<Box<dyn ReportObserver>>,
    ) -> TestRun {
        if let Err(err) = self.config.validate() {
            return TestRun::aborted(err);
        }

        let world = match SimWorld::launch(field, faults, self.config.world_buffer) {
            Ok(world) => world,
            Err(err) => return TestRun::aborted(err),
        };
        let (publisher, source, server) = world.into_parts();

        let clock = SimClock::new();
        let driver = TickDriver::new(publisher, source)
            .with_clock(clock.clone())
            .with_realtime_pacing(self.config.realtime_pacing);

        let mut orchestrator =
            TestOrchestrator::new(driver).with_early_exit(self.config.exit_on_eventually_passed);
        for observer in observers {
            orchestrator.add_observer(observer);
        }

        let timeout = self.config.timeout;
        let tick_duration = self.config.tick_duration;
        let bridge = ConcurrencyBridge::from_config(&self.config);

        let outcome = if self.config.visualization_enabled {
            let (mut display, display_observer) = self.open_display();
            if let Some(observer) = display_observer {
                orchestrator.add_observer(observer);
            }
            bridge.run_with_visualization(
                move || orchestrator.run(always, eventually, timeout, tick_duration),
                display.as_mut(),
            )
        } else {
            bridge.run_headless(move || orchestrator.run(always, eventually, timeout, tick_duration))
        };

        // The orchestrator is gone, so the tick channel is closed
        let server = server.join();
        let elapsed = clock.elapsed();

        TestRun {
            outcome,
            ticks: ticks_in(elapsed, tick_duration),
            elapsed,
            server,
        }
    }

    fn open_display(&mut self) -> (Box<dyn Display>, Option<Box<dyn ReportObserver>>) {
        match self.display.take() {
            Some(display) => (display, None),
            None => default_display(self.config.effective_layout()),
        }
    }
}

/// Every tick advances the clock by exactly one tick duration.
fn ticks_in(elapsed: Duration, tick_duration: Duration) -> u64 {
    if tick_duration.is_zero() {
        return 0;
    }
    u64::try_from(elapsed.as_nanos() / tick_duration.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(feature = "dashboard")]
fn default_display(layout: Option<&str>) -> (Box<dyn Display>, Option<Box<dyn ReportObserver>>) {
    use crate::observer::ChannelObserver;
    use fieldtest_core::dashboard::{DashboardLayout, ValidationDashboard};
    use fieldtest_core::frame_channel;

    let layout = match layout {
        Some(id) => DashboardLayout::parse(id).unwrap_or_else(|| {
            tracing::warn!("Unknown display layout '{}', using default", id);
            DashboardLayout::default()
        }),
        None => DashboardLayout::default(),
    };

    let (tx, rx) = frame_channel();
    (
        Box::new(ValidationDashboard::new(rx, layout)),
        Some(Box::new(ChannelObserver::new(tx))),
    )
}

#[cfg(not(feature = "dashboard"))]
fn default_display(layout: Option<&str>) -> (Box<dyn Display>, Option<Box<dyn ReportObserver>>) {
    info!("Terminal dashboard not available (compile with --features dashboard)");
    if let Some(id) = layout {
        tracing::debug!("Display layout '{}' ignored", id);
    }
    (Box::new(fieldtest_env::SignalDisplay::new()), None)
}

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    pub outcome: TestOutcome,

    /// Outcome the scenario should produce
    pub expected: OutcomeKind,

    /// Whether the outcome matched the expectation
    pub passed: bool,

    /// Total ticks executed
    pub total_ticks: u64,

    /// Final simulation time in seconds
    pub final_time_secs: f64,

    /// Failure message if any
    pub failure_reason: Option<String>,
}

/// Runs built-in scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    config: TestConfig,

    /// Write a JSON recording of each run here
    export_path: Option<PathBuf>,

    /// Stream runs to a Rerun viewer
    rerun: bool,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64, config: TestConfig) -> Self {
        Self {
            seed,
            config,
            export_path: None,
            rerun: false,
        }
    }

    /// Records each run to a JSON file.
    pub fn with_export(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = Some(path.into());
        self
    }

    /// Streams each run to a Rerun viewer.
    pub fn with_rerun(mut self, enabled: bool) -> Self {
        self.rerun = enabled;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        debug!("  {}", scenario.description());

        let setup = scenario.build(self.seed);
        let mut observers: Vec<Box<dyn ReportObserver>> = Vec::new();

        let export = self.export_path.as_ref().map(|_| {
            Arc::new(Mutex::new(RunExport::new(
                scenario.name(),
                self.seed,
                self.config.timeout,
                self.config.tick_duration,
            )))
        });
        if let Some(export) = &export {
            observers.push(Box::new(ExportRecorder::new(Arc::clone(export))));
        }
        if self.rerun {
            observers.push(Box::new(RerunObserver::new(&format!("fieldtest_{}", scenario.name()))));
        }

        let mut runner = SimulatedTestRunner::new(self.config.clone());
        let run = runner.run_test(setup.field, setup.faults, setup.always, setup.eventually, observers);

        if let (Some(path), Some(export)) = (&self.export_path, &export) {
            match export.lock() {
                Ok(export) => match export.write_to_file(path) {
                    Ok(()) => info!("Exported {} frames to {}", export.frames.len(), path.display()),
                    Err(e) => error!("Failed to write export: {:?}", e),
                },
                Err(_) => error!("Export recorder poisoned, nothing written"),
            }
        }

        let expected = scenario.expected();
        let passed = run.outcome.kind() == expected;
        let failure_reason = if passed {
            None
        } else {
            Some(format!(
                "expected {}, got {}{}",
                expected,
                run.outcome.kind(),
                run.outcome
                    .failure_reason()
                    .map(|r| format!(": {}", r))
                    .unwrap_or_default()
            ))
        };

        ScenarioResult {
            scenario,
            seed: self.seed,
            expected,
            passed,
            total_ticks: run.ticks,
            final_time_secs: run.elapsed.as_secs_f64(),
            failure_reason,
            outcome: run.outcome,
        }
    }
}
