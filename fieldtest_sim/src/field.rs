//! Simulated field - the ground truth served to the orchestrator.
//!
//! A small deterministic kinematic model:
//! - Robots move at constant velocity or drive toward a target point
//! - The ball rolls and decelerates under friction
//! - Optional Gaussian sensor noise on reported robot positions
//!
//! The same seed always produces the same sequence of snapshots.

use fieldtest_core::Region;
use fieldtest_env::{BallState, RobotState, Team, WorldSnapshot};
use nalgebra::{Point2, Vector2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::collections::BTreeMap;

/// Field length along x, in meters.
pub const FIELD_LENGTH_M: f64 = 9.0;

/// Field width along y, in meters.
pub const FIELD_WIDTH_M: f64 = 6.0;

/// Goal depth behind the goal line.
pub const GOAL_DEPTH_M: f64 = 0.7;

/// Goal mouth width.
pub const GOAL_WIDTH_M: f64 = 1.0;

pub const CENTER_CIRCLE_RADIUS_M: f64 = 0.5;

/// Default rolling deceleration of the ball, in m/s^2.
pub const DEFAULT_BALL_FRICTION: f64 = 0.3;

/// The playing area, centred on the origin.
pub fn field_region() -> Region {
    Region::rectangle(
        Point2::new(-FIELD_LENGTH_M / 2.0, -FIELD_WIDTH_M / 2.0),
        Point2::new(FIELD_LENGTH_M / 2.0, FIELD_WIDTH_M / 2.0),
    )
}

/// The goal on the positive-x side.
pub fn goal_region() -> Region {
    let line = FIELD_LENGTH_M / 2.0;
    Region::rectangle(
        Point2::new(line, -GOAL_WIDTH_M / 2.0),
        Point2::new(line + GOAL_DEPTH_M, GOAL_WIDTH_M / 2.0),
    )
}

pub fn center_circle() -> Region {
    Region::circle(Point2::origin(), CENTER_CIRCLE_RADIUS_M)
}

/// A robot as the field sees it.
#[derive(Debug, Clone)]
struct SimRobot {
    state: RobotState,

    /// Point the robot drives toward, if any
    target: Option<Point2<f64>>,

    /// Speed used when driving toward a target (m/s)
    max_speed: f64,
}

impl SimRobot {
    fn step(&mut self, dt: f64) {
        if let Some(target) = self.target {
            let offset = target - self.state.position;
            let distance = offset.norm();
            let reach = self.max_speed * dt;

            if distance <= reach {
                self.state.position = target;
                self.state.velocity = Vector2::zeros();
                self.target = None;
                return;
            }

            let direction = offset / distance;
            self.state.velocity = direction * self.max_speed;
            self.state.orientation = direction.y.atan2(direction.x);
        }

        self.state.position += self.state.velocity * dt;
    }
}

/// Deterministic simulated field.
pub struct SimulatedField {
    seed: u64,

    /// RNG for sensor noise
    rng: ChaCha8Rng,

    /// Robots keyed by (team, id) so snapshots are ordered
    robots: BTreeMap<(Team, u32), SimRobot>,

    ball: BallState,

    /// Current simulated time (seconds)
    time_s: f64,

    /// Position noise applied to reported robot positions
    noise: Option<Normal<f64>>,

    /// Ball deceleration (m/s^2)
    ball_friction: f64,
}

impl SimulatedField {
    /// Creates an empty field with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            robots: BTreeMap::new(),
            ball: BallState::default(),
            time_s: 0.0,
            noise: None,
            ball_friction: DEFAULT_BALL_FRICTION,
        }
    }

    /// Enables Gaussian noise on reported robot positions.
    ///
    /// A non-finite or negative deviation leaves noise disabled.
    pub fn with_sensor_noise(mut self, std_dev: f64) -> Self {
        self.noise = match Normal::new(0.0, std_dev) {
            Ok(normal) if std_dev > 0.0 => Some(normal),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Ignoring sensor noise {}: {}", std_dev, e);
                None
            }
        };
        self
    }

    /// Sets the ball's rolling deceleration.
    pub fn with_ball_friction(mut self, friction: f64) -> Self {
        self.ball_friction = friction.max(0.0);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Places a robot on the field, replacing any robot with the same key.
    pub fn spawn_robot(&mut self, team: Team, id: u32, position: Point2<f64>) {
        let robot = SimRobot {
            state: RobotState {
                id,
                team,
                position,
                velocity: Vector2::zeros(),
                orientation: 0.0,
            },
            target: None,
            max_speed: 0.0,
        };
        self.robots.insert((team, id), robot);
    }

    /// Sets a constant velocity, cancelling any target.
    ///
    /// Returns false if the robot does not exist.
    pub fn set_robot_velocity(&mut self, team: Team, id: u32, velocity: Vector2<f64>) -> bool {
        match self.robots.get_mut(&(team, id)) {
            Some(robot) => {
                robot.target = None;
                robot.state.velocity = velocity;
                if velocity.norm() > 0.0 {
                    robot.state.orientation = velocity.y.atan2(velocity.x);
                }
                true
            }
            None => false,
        }
    }

    /// Drives a robot toward `target` at `speed`; it stops on arrival.
    ///
    /// Returns false if the robot does not exist.
    pub fn move_robot_to(&mut self, team: Team, id: u32, target: Point2<f64>, speed: f64) -> bool {
        match self.robots.get_mut(&(team, id)) {
            Some(robot) => {
                robot.target = Some(target);
                robot.max_speed = speed.abs();
                true
            }
            None => false,
        }
    }

    /// Places the ball with the given velocity.
    pub fn set_ball(&mut self, position: Point2<f64>, velocity: Vector2<f64>) {
        self.ball = BallState { position, velocity };
    }

    /// Advances physics by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        self.time_s += dt;

        for robot in self.robots.values_mut() {
            robot.step(dt);
        }

        self.ball.position += self.ball.velocity * dt;
        let speed = self.ball.velocity.norm();
        if speed > 0.0 {
            let slowed = (speed - self.ball_friction * dt).max(0.0);
            self.ball.velocity *= slowed / speed;
        }
    }

    /// Current simulated time.
    pub fn time(&self) -> f64 {
        self.time_s
    }

    /// Builds the observable snapshot for the given tick number.
    pub fn snapshot(&mut self, tick: u64) -> WorldSnapshot {
        let mut robots = Vec::with_capacity(self.robots.len());
        for robot in self.robots.values() {
            let mut state = robot.state.clone();
            if let Some(noise) = &self.noise {
                state.position.x += noise.sample(&mut self.rng);
                state.position.y += noise.sample(&mut self.rng);
            }
            robots.push(state);
        }

        WorldSnapshot {
            tick,
            timestamp_s: self.time_s,
            robots,
            ball: self.ball.clone(),
        }
    }

    /// True position of a robot, without noise.
    pub fn robot_position(&self, team: Team, id: u32) -> Option<Point2<f64>> {
        self.robots.get(&(team, id)).map(|r| r.state.position)
    }
}
