//! Stock positional predicates.

use crate::region::Region;
use crate::validation::{Validation, ValidationVerdict};
use fieldtest_env::{Team, WorldSnapshot};

/// Passes once the given robot is inside the region.
#[derive(Debug, Clone)]
pub struct RobotEntersRegion {
    pub team: Team,
    pub robot_id: u32,
    pub region: Region,
}

impl RobotEntersRegion {
    pub fn new(team: Team, robot_id: u32, region: Region) -> Self {
        Self { team, robot_id, region }
    }
}

impl Validation for RobotEntersRegion {
    fn validate(&self, world: &WorldSnapshot) -> ValidationVerdict {
        match world.robot(self.team, self.robot_id) {
            Some(robot) if self.region.contains(&robot.position) => ValidationVerdict::passed(),
            Some(robot) => ValidationVerdict::pending().with_detail(format!(
                "robot at ({:.2}, {:.2})",
                robot.position.x, robot.position.y
            )),
            None => ValidationVerdict::pending().with_detail("robot not on field"),
        }
    }

    fn name(&self) -> String {
        format!("{} robot {} enters {}", self.team, self.robot_id, self.region)
    }
}

/// Passes once the ball is inside the region.
#[derive(Debug, Clone)]
pub struct BallEntersRegion {
    pub region: Region,
}

impl BallEntersRegion {
    pub fn new(region: Region) -> Self {
        Self { region }
    }
}

impl Validation for BallEntersRegion {
    fn validate(&self, world: &WorldSnapshot) -> ValidationVerdict {
        let ball = &world.ball.position;
        if self.region.contains(ball) {
            ValidationVerdict::passed()
        } else {
            ValidationVerdict::pending().with_detail(format!("ball at ({:.2}, {:.2})", ball.x, ball.y))
        }
    }

    fn name(&self) -> String {
        format!("ball enters {}", self.region)
    }
}

/// Continuous condition: fails as soon as the robot leaves the region.
///
/// Stays `Pending` while it holds, so it is meant for always-sets.
#[derive(Debug, Clone)]
pub struct RobotStaysInRegion {
    pub team: Team,
    pub robot_id: u32,
    pub region: Region,
}

impl RobotStaysInRegion {
    pub fn new(team: Team, robot_id: u32, region: Region) -> Self {
        Self { team, robot_id, region }
    }
}

impl Validation for RobotStaysInRegion {
    fn validate(&self, world: &WorldSnapshot) -> ValidationVerdict {
        match world.robot(self.team, self.robot_id) {
            Some(robot) if self.region.contains(&robot.position) => ValidationVerdict::pending(),
            Some(robot) => ValidationVerdict::failed(format!(
                "robot left region at ({:.2}, {:.2}), t={:.3}s",
                robot.position.x, robot.position.y, world.timestamp_s
            )),
            None => ValidationVerdict::failed("robot not on field"),
        }
    }

    fn name(&self) -> String {
        format!("{} robot {} stays in {}", self.team, self.robot_id, self.region)
    }
}
