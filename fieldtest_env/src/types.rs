//! Common value types exchanged with the system under test.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MILLISECONDS_PER_SECOND: f64 = 1000.0;

/// Command asking the system under test to advance by one step.
///
/// Created once per loop iteration, sent, and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationTick {
    /// Step duration in simulated milliseconds
    pub milliseconds: f64,
}

impl SimulationTick {
    /// Creates a tick from a step duration.
    pub fn new(duration: Duration) -> Self {
        Self {
            milliseconds: duration.as_secs_f64() * MILLISECONDS_PER_SECOND,
        }
    }

    /// Returns the step duration.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.milliseconds.max(0.0) / MILLISECONDS_PER_SECOND)
    }

    /// Returns the step duration in seconds.
    pub fn seconds(&self) -> f64 {
        self.milliseconds / MILLISECONDS_PER_SECOND
    }
}

/// Team a robot plays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    Blue,
    Yellow,
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Team::Blue => write!(f, "blue"),
            Team::Yellow => write!(f, "yellow"),
        }
    }
}

/// Observed state of one robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    /// Robot id, unique within its team
    pub id: u32,

    pub team: Team,

    /// Position in meters (field frame, origin at centre)
    pub position: Point2<f64>,

    /// Velocity in m/s
    pub velocity: Vector2<f64>,

    /// Heading in radians
    pub orientation: f64,
}

/// Observed state of the ball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub position: Point2<f64>,
    pub velocity: Vector2<f64>,
}

impl Default for BallState {
    fn default() -> Self {
        Self {
            position: Point2::origin(),
            velocity: Vector2::zeros(),
        }
    }
}

/// Full observable state of the simulated environment at one tick boundary.
///
/// Produced exactly once per tick and consumed exactly once by the
/// orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Producer's tick sequence number (1 for the first tick served)
    pub tick: u64,

    /// Simulated time in seconds since the start of the run
    pub timestamp_s: f64,

    /// All robots on the field, ordered by (team, id)
    pub robots: Vec<RobotState>,

    pub ball: BallState,
}

impl WorldSnapshot {
    /// Creates an empty snapshot for the given tick.
    pub fn empty(tick: u64, timestamp_s: f64) -> Self {
        Self {
            tick,
            timestamp_s,
            robots: Vec::new(),
            ball: BallState::default(),
        }
    }

    /// Looks up a robot by team and id.
    pub fn robot(&self, team: Team, id: u32) -> Option<&RobotState> {
        self.robots.iter().find(|r| r.team == team && r.id == id)
    }

    /// Returns all robots of one team.
    pub fn team(&self, team: Team) -> impl Iterator<Item = &RobotState> {
        self.robots.iter().filter(move |r| r.team == team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tick_milliseconds() {
        let tick = SimulationTick::new(Duration::from_millis(50));
        assert_relative_eq!(tick.milliseconds, 50.0);
        assert_eq!(tick.duration(), Duration::from_millis(50));
        assert_relative_eq!(tick.seconds(), 0.05);
    }

    #[test]
    fn test_snapshot_robot_lookup() {
        let mut world = WorldSnapshot::empty(1, 0.016);
        world.robots.push(RobotState {
            id: 3,
            team: Team::Yellow,
            position: Point2::new(1.0, 2.0),
            velocity: Vector2::zeros(),
            orientation: 0.0,
        });

        assert!(world.robot(Team::Yellow, 3).is_some());
        assert!(world.robot(Team::Blue, 3).is_none());
        assert_eq!(world.team(Team::Yellow).count(), 1);
    }
}
