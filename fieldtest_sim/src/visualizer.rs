//! Rerun visualization for simulated test runs.
//!
//! Visualization is optional and only available with the `visualization`
//! feature. Without it the observer is a no-op.
//!
//! # What Gets Logged
//!
//! - Robots as points, blue and yellow per team
//! - The ball as an orange point
//! - Pending sequence counts as scalar timelines
//! - Failed sequences and the final outcome as text logs

use crate::observer::ReportObserver;
use crate::outcome::TestOutcome;

use fieldtest_core::ValidationReport;
use fieldtest_env::WorldSnapshot;
#[cfg(feature = "visualization")]
use fieldtest_core::ValidationStatus;
#[cfg(feature = "visualization")]
use fieldtest_env::Team;
#[cfg(feature = "visualization")]
use rerun::{Color, Points3D, Position3D, Radius, RecordingStream};
use std::time::Duration;

/// Observer that streams each tick to a Rerun viewer.
pub struct RerunObserver {
    #[cfg(feature = "visualization")]
    rec: Option<RecordingStream>,

    /// Whether visualization is enabled
    enabled: bool,
}

impl RerunObserver {
    /// Creates an observer with visualization disabled.
    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "visualization")]
            rec: None,
            enabled: false,
        }
    }

    /// Spawns a Rerun viewer and streams to it.
    #[cfg(feature = "visualization")]
    pub fn new(name: &str) -> Self {
        match rerun::RecordingStreamBuilder::new(name).spawn() {
            Ok(rec) => {
                tracing::info!("Rerun visualization enabled - open Rerun Viewer to follow the run");
                Self {
                    rec: Some(rec),
                    enabled: true,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to initialize Rerun: {:?}", e);
                Self::disabled()
            }
        }
    }

    /// Returns a disabled observer when the feature is off.
    #[cfg(not(feature = "visualization"))]
    pub fn new(_name: &str) -> Self {
        tracing::info!("Rerun visualization not available (compile with --features visualization)");
        Self::disabled()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[cfg(feature = "visualization")]
    fn log_world(&self, elapsed: Duration, world: &WorldSnapshot) {
        if let Some(ref rec) = self.rec {
            rec.set_time_seconds("sim_time", elapsed.as_secs_f64());

            for team in [Team::Blue, Team::Yellow] {
                let points: Vec<Position3D> = world
                    .team(team)
                    .map(|r| Position3D::new(r.position.x as f32, r.position.y as f32, 0.0))
                    .collect();
                let color = match team {
                    Team::Blue => Color::from_rgb(60, 90, 255),
                    Team::Yellow => Color::from_rgb(255, 220, 0),
                };

                let _ = rec.log(
                    format!("field/robots/{}", team),
                    &Points3D::new(points)
                        .with_colors([color])
                        .with_radii([Radius::new_scene_units(0.09)]),
                );
            }

            let ball = &world.ball.position;
            let _ = rec.log(
                "field/ball",
                &Points3D::new([Position3D::new(ball.x as f32, ball.y as f32, 0.0)])
                    .with_colors([Color::from_rgb(255, 140, 0)])
                    .with_radii([Radius::new_scene_units(0.0215)]),
            );
        }
    }

    #[cfg(not(feature = "visualization"))]
    fn log_world(&self, _elapsed: Duration, _world: &WorldSnapshot) {}

    #[cfg(feature = "visualization")]
    fn log_report(&self, kind: &str, report: &ValidationReport) {
        if let Some(ref rec) = self.rec {
            let _ = rec.log(
                format!("validation/{}/pending", kind),
                &rerun::Scalar::new(report.count(ValidationStatus::Pending) as f64),
            );

            for seq in report.sequences.iter().filter(|s| s.status == ValidationStatus::Failed) {
                let _ = rec.log(format!("validation/{}/events", kind), &rerun::TextLog::new(seq.to_string()));
            }
        }
    }

    #[cfg(not(feature = "visualization"))]
    fn log_report(&self, _kind: &str, _report: &ValidationReport) {}

    #[cfg(feature = "visualization")]
    fn log_outcome(&self, outcome: &TestOutcome) {
        if let Some(ref rec) = self.rec {
            let _ = rec.log("validation/outcome", &rerun::TextLog::new(outcome.to_string()));
        }
    }

    #[cfg(not(feature = "visualization"))]
    fn log_outcome(&self, _outcome: &TestOutcome) {}
}

impl ReportObserver for RerunObserver {
    fn on_tick(
        &mut self,
        elapsed: Duration,
        world: &WorldSnapshot,
        eventually: &ValidationReport,
        always: &ValidationReport,
    ) {
        if !self.enabled {
            return;
        }
        self.log_world(elapsed, world);
        self.log_report("eventually", eventually);
        self.log_report("always", always);
    }

    fn on_finish(&mut self, outcome: &TestOutcome) {
        if self.enabled {
            self.log_outcome(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_observer() {
        let mut observer = RerunObserver::disabled();
        assert!(!observer.is_enabled());

        // These should be no-ops
        let report = ValidationReport::default();
        observer.on_tick(Duration::from_millis(16), &WorldSnapshot::empty(1, 0.016), &report, &report);
        observer.on_finish(&TestOutcome::Passed);
    }
}
