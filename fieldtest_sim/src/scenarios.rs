//! Built-in field scenarios for the simulated test runner.
//!
//! Each scenario sets up a field, a fault plan and its validation sets,
//! and knows which outcome a default-configured run must produce.

use crate::field::{center_circle, field_region, goal_region, SimulatedField};
use crate::outcome::OutcomeKind;
use crate::world::FaultPlan;

use fieldtest_core::{
    BallEntersRegion, Region, RobotEntersRegion, RobotStaysInRegion, ValidationSequence, ValidationSequenceSet,
};
use fieldtest_env::Team;
use nalgebra::{Point2, Vector2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// FT-001: Robot drives into the centre circle
    RobotReachesCenter,

    /// FT-002: Ball rolls through the attacking half into the goal
    BallIntoGoal,

    /// FT-003: Robot drives off the field, violating an always check
    RobotLeavesField,

    /// FT-004: Robot halts short of its region, eventually check times out
    UnreachableTarget,

    /// FT-005: Field server drops the transport mid-run
    TransportDrop,
}

/// Everything needed to run one scenario.
pub struct ScenarioSetup {
    pub field: SimulatedField,
    pub faults: FaultPlan,
    pub always: ValidationSequenceSet,
    pub eventually: ValidationSequenceSet,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::RobotReachesCenter,
            ScenarioId::BallIntoGoal,
            ScenarioId::RobotLeavesField,
            ScenarioId::UnreachableTarget,
            ScenarioId::TransportDrop,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::RobotReachesCenter => "robot_reaches_center",
            ScenarioId::BallIntoGoal => "ball_into_goal",
            ScenarioId::RobotLeavesField => "robot_leaves_field",
            ScenarioId::UnreachableTarget => "unreachable_target",
            ScenarioId::TransportDrop => "transport_drop",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::RobotReachesCenter => "Blue robot drives to the centre circle while staying on the field",
            ScenarioId::BallIntoGoal => "Ball rolls into the attacking half, then into the goal",
            ScenarioId::RobotLeavesField => "Blue robot drives over the goal line; always check fails",
            ScenarioId::UnreachableTarget => "Blue robot stops 1m short of the centre circle; timeout",
            ScenarioId::TransportDrop => "Field server closes the world channel after 30 ticks",
        }
    }

    /// Outcome a run with default timing must produce.
    pub fn expected(&self) -> OutcomeKind {
        match self {
            ScenarioId::RobotReachesCenter | ScenarioId::BallIntoGoal => OutcomeKind::Passed,
            ScenarioId::RobotLeavesField => OutcomeKind::FailedAlways,
            ScenarioId::UnreachableTarget => OutcomeKind::FailedEventuallyTimeout,
            ScenarioId::TransportDrop => OutcomeKind::FailedException,
        }
    }

    /// Builds the scenario. The seed jitters start positions and drives
    /// sensor noise without changing the expected outcome.
    pub fn build(&self, seed: u64) -> ScenarioSetup {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut jitter = |range: f64| rng.gen_range(-range..=range);

        match self {
            ScenarioId::RobotReachesCenter => {
                let mut field = SimulatedField::new(seed).with_sensor_noise(0.01);
                field.spawn_robot(Team::Blue, 0, Point2::new(-2.0 + jitter(0.2), jitter(0.2)));
                field.move_robot_to(Team::Blue, 0, Point2::origin(), 1.5);

                ScenarioSetup {
                    field,
                    faults: FaultPlan::none(),
                    always: stays_on_field(Team::Blue, 0),
                    eventually: ValidationSequenceSet::new().with(
                        ValidationSequence::new("blue_0_reaches_center")
                            .then(RobotEntersRegion::new(Team::Blue, 0, center_circle())),
                    ),
                }
            }

            ScenarioId::BallIntoGoal => {
                let mut field = SimulatedField::new(seed);
                field.spawn_robot(Team::Yellow, 0, Point2::new(3.5, jitter(0.5)));
                field.set_ball(Point2::new(-1.0, jitter(0.05)), Vector2::new(3.0, 0.0));

                let attacking_half = Region::rectangle(Point2::new(0.0, -3.0), Point2::new(4.5, 3.0));

                ScenarioSetup {
                    field,
                    faults: FaultPlan::none(),
                    always: stays_on_field(Team::Yellow, 0),
                    eventually: ValidationSequenceSet::new().with(
                        ValidationSequence::new("ball_into_goal")
                            .then(BallEntersRegion::new(attacking_half))
                            .then(BallEntersRegion::new(goal_region())),
                    ),
                }
            }

            ScenarioId::RobotLeavesField => {
                let mut field = SimulatedField::new(seed);
                field.spawn_robot(Team::Blue, 1, Point2::new(3.5, jitter(1.0)));
                field.set_robot_velocity(Team::Blue, 1, Vector2::new(1.5, 0.0));

                ScenarioSetup {
                    field,
                    faults: FaultPlan::none(),
                    always: stays_on_field(Team::Blue, 1),
                    eventually: ValidationSequenceSet::new(),
                }
            }

            ScenarioId::UnreachableTarget => {
                let mut field = SimulatedField::new(seed).with_sensor_noise(0.01);
                field.spawn_robot(Team::Blue, 0, Point2::new(-3.0, jitter(0.1)));
                // Stops at x = -1.0, the circle edge is at -0.5
                field.move_robot_to(Team::Blue, 0, Point2::new(-1.0, 0.0), 2.0);

                ScenarioSetup {
                    field,
                    faults: FaultPlan::none(),
                    always: stays_on_field(Team::Blue, 0),
                    eventually: ValidationSequenceSet::new().with(
                        ValidationSequence::new("blue_0_reaches_center")
                            .then(RobotEntersRegion::new(Team::Blue, 0, center_circle())),
                    ),
                }
            }

            ScenarioId::TransportDrop => {
                let mut field = SimulatedField::new(seed);
                field.spawn_robot(Team::Blue, 0, Point2::new(jitter(1.0), jitter(1.0)));

                ScenarioSetup {
                    field,
                    faults: FaultPlan::drop_after(30),
                    always: stays_on_field(Team::Blue, 0),
                    eventually: ValidationSequenceSet::new(),
                }
            }
        }
    }
}

fn stays_on_field(team: Team, id: u32) -> ValidationSequenceSet {
    ValidationSequenceSet::new().with(
        ValidationSequence::new(format!("{}_{}_stays_on_field", team, id))
            .then(RobotStaysInRegion::new(team, id, field_region())),
    )
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "robot_reaches_center" | "reaches_center" | "ft-001" => Ok(ScenarioId::RobotReachesCenter),
            "ball_into_goal" | "goal" | "ft-002" => Ok(ScenarioId::BallIntoGoal),
            "robot_leaves_field" | "leaves_field" | "ft-003" => Ok(ScenarioId::RobotLeavesField),
            "unreachable_target" | "unreachable" | "ft-004" => Ok(ScenarioId::UnreachableTarget),
            "transport_drop" | "drop" | "ft-005" => Ok(ScenarioId::TransportDrop),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for id in ScenarioId::all() {
            assert_eq!(id.name().parse::<ScenarioId>(), Ok(id));
        }
        assert_eq!("FT-003".parse::<ScenarioId>(), Ok(ScenarioId::RobotLeavesField));
        assert!("nope".parse::<ScenarioId>().is_err());
    }

    #[test]
    fn test_descriptions_are_distinct() {
        let descriptions: std::collections::HashSet<&str> =
            ScenarioId::all().iter().map(|id| id.description()).collect();
        assert_eq!(descriptions.len(), ScenarioId::all().len());
        assert!(descriptions.iter().all(|d| !d.is_empty()));
    }

    #[test]
    fn test_build_is_seed_deterministic() {
        let mut a = ScenarioId::RobotReachesCenter.build(11).field;
        let mut b = ScenarioId::RobotReachesCenter.build(11).field;
        assert_eq!(a.snapshot(1), b.snapshot(1));
    }

    #[test]
    fn test_setup_shapes() {
        let setup = ScenarioId::BallIntoGoal.build(0);
        assert_eq!(setup.eventually.len(), 1);
        assert_eq!(setup.always.len(), 1);

        let setup = ScenarioId::TransportDrop.build(0);
        assert_eq!(setup.faults.drop_after, Some(30));
        assert!(setup.eventually.is_empty());
    }
}
