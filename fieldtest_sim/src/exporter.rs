//! JSON exporter for recorded runs.
//!
//! Records every tick's validation frame so a run can be replayed or
//! inspected offline.

use crate::observer::ReportObserver;
use crate::outcome::{OutcomeKind, TestOutcome};

use fieldtest_core::{ValidationFrame, ValidationReport};
use fieldtest_env::WorldSnapshot;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Complete run export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunExport {
    /// Unique id of this run
    pub run_id: Uuid,

    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    pub timeout_s: f64,
    pub tick_duration_s: f64,

    /// All frames, in tick order
    pub frames: Vec<ValidationFrame>,

    /// Final outcome, set by `finalize`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    /// Ticks recorded
    pub total_ticks: u64,
}

impl RunExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64, timeout: Duration, tick_duration: Duration) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            scenario: scenario.to_string(),
            seed,
            timeout_s: timeout.as_secs_f64(),
            tick_duration_s: tick_duration.as_secs_f64(),
            frames: Vec::new(),
            outcome: None,
            failure_reason: None,
            total_ticks: 0,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: ValidationFrame) {
        self.total_ticks = frame.world.tick;
        self.frames.push(frame);
    }

    /// Records the final outcome.
    pub fn finalize(&mut self, outcome: &TestOutcome) {
        self.outcome = Some(outcome.kind());
        self.failure_reason = outcome.failure_reason();
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Observer that appends frames to a shared [`RunExport`].
///
/// The export stays readable from the caller's side after the run thread
/// has finished with the observer.
pub struct ExportRecorder {
    export: Arc<Mutex<RunExport>>,
}

impl ExportRecorder {
    pub fn new(export: Arc<Mutex<RunExport>>) -> Self {
        Self { export }
    }
}

impl ReportObserver for ExportRecorder {
    fn on_tick(
        &mut self,
        elapsed: Duration,
        world: &WorldSnapshot,
        eventually: &ValidationReport,
        always: &ValidationReport,
    ) {
        if let Ok(mut export) = self.export.lock() {
            export.add_frame(ValidationFrame {
                elapsed_s: elapsed.as_secs_f64(),
                world: world.clone(),
                eventually: eventually.clone(),
                always: always.clone(),
            });
        }
    }

    fn on_finish(&mut self, outcome: &TestOutcome) {
        if let Ok(mut export) = self.export.lock() {
            export.finalize(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_collects_frames_and_outcome() {
        let export = Arc::new(Mutex::new(RunExport::new(
            "robot_reaches_center",
            7,
            Duration::from_secs(1),
            Duration::from_millis(100),
        )));
        let mut recorder = ExportRecorder::new(Arc::clone(&export));

        let report = ValidationReport::default();
        for tick in 1..=3 {
            let world = WorldSnapshot::empty(tick, tick as f64 * 0.1);
            recorder.on_tick(Duration::from_millis(tick * 100), &world, &report, &report);
        }
        recorder.on_finish(&TestOutcome::Passed);

        let export = export.lock().unwrap();
        assert_eq!(export.frames.len(), 3);
        assert_eq!(export.total_ticks, 3);
        assert_eq!(export.outcome, Some(OutcomeKind::Passed));
        assert!(export.failure_reason.is_none());
    }

    #[test]
    fn test_export_serializes() {
        let mut export = RunExport::new("ball_into_goal", 1, Duration::from_secs(1), Duration::from_millis(50));
        export.add_frame(ValidationFrame {
            elapsed_s: 0.05,
            world: WorldSnapshot::empty(1, 0.05),
            eventually: ValidationReport::default(),
            always: ValidationReport::default(),
        });

        let json = serde_json::to_string(&export).unwrap();
        assert!(json.contains("\"scenario\":\"ball_into_goal\""));
        assert!(!json.contains("failure_reason"));

        let parsed: RunExport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.run_id, export.run_id);
        assert_eq!(parsed.frames.len(), 1);
    }
}
