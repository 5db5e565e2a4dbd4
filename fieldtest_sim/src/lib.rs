//! fieldtest Simulated Test Orchestration
//!
//! This crate drives a simulated field one tick at a time and judges each
//! resulting world snapshot against two sets of validation sequences:
//! - **Always**: must hold on every tick; the first violation ends the run
//! - **Eventually**: must all have passed by the time the timeout elapses
//!
//! # Core Principle: Lockstep Ticks
//!
//! The orchestrator and the simulated world never run ahead of each other:
//! every published tick is answered by exactly one snapshot, and every
//! snapshot is validated exactly once. Simulated time only moves when a
//! tick is published.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   SimulatedTestRunner                       │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │ ConcurrencyBridge (headless / background + display)  │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │       │                                                     │
//! │  ┌────▼──────────────┐  tick   ┌─────────────────────┐      │
//! │  │  TestOrchestrator │────────►│  SimWorld server    │      │
//! │  │  (TickDriver +    │◄────────│  (SimulatedField)   │      │
//! │  │   engine)         │ snapshot└─────────────────────┘      │
//! │  └────┬──────────────┘                                      │
//! │       │ reports                                             │
//! │  ┌────▼──────────────────────────────────┐                  │
//! │  │ Observers (dashboard, Rerun, export)  │                  │
//! │  └───────────────────────────────────────┘                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use fieldtest_sim::{FaultPlan, SimulatedField, SimulatedTestRunner, TestConfig};
//!
//! let mut runner = SimulatedTestRunner::new(TestConfig::default());
//! let run = runner.run_test(field, FaultPlan::none(), always, eventually, Vec::new());
//! assert!(run.outcome.is_passed());
//! ```

mod bridge;
mod clock;
mod config;
mod error;
mod exporter;
mod field;
mod observer;
mod orchestrator;
mod outcome;
mod runner;
mod tick;
mod visualizer;
mod world;
pub mod scenarios;

pub use bridge::ConcurrencyBridge;
pub use clock::SimClock;
pub use config::{
    expected_ticks, validate_timing, TestConfig, DEFAULT_TICK_RATE_HZ, DEFAULT_TIMEOUT_S, PAUSE_AFTER_FAIL_DELAY,
    PROCESS_BUFFER_DELAY,
};
pub use error::TestError;
pub use exporter::{ExportRecorder, RunExport};
pub use field::{center_circle, field_region, goal_region, SimulatedField, FIELD_LENGTH_M, FIELD_WIDTH_M};
pub use observer::{ChannelObserver, ReportObserver};
pub use orchestrator::TestOrchestrator;
pub use outcome::{OutcomeKind, TestOutcome};
pub use runner::{ScenarioResult, ScenarioRunner, SimulatedTestRunner, TestRun};
pub use tick::TickDriver;
pub use visualizer::RerunObserver;
pub use world::{FaultPlan, FieldServerHandle, ServerReport, SimWorld};
