//! Obstacle avoidance rules.

use contracts::{DecisionSnapshot, FollowUpAction, Instruction};

use crate::rule::{pick_free_side, wider_side, GuidanceRule, Side};

/// Side clearance needed to dodge an immediate front obstacle (meters)
const IMMEDIATE_FREE_M: f64 = 1.5;
/// Side clearance needed to detour around a route obstacle (meters)
const DETOUR_FREE_M: f64 = 2.0;
/// Front distance below which the obstacle is immediate (meters)
const IMMEDIATE_FRONT_M: f64 = 1.0;
/// Front distance below which the obstacle deserves preparation (meters)
const MEDIUM_FRONT_M: f64 = 2.0;
/// Heading deviation within which a front obstacle sits on the route (degrees)
const ON_ROUTE_DEVIATION_DEG: f64 = 30.0;
/// Detour leg walked before resuming the route (meters)
const DETOUR_LEG_M: f64 = 1.5;

fn turn_action(side: Side) -> FollowUpAction {
    match side {
        Side::Left => FollowUpAction::TurnLeft,
        Side::Right => FollowUpAction::TurnRight,
    }
}

/// Head-height obstacle, the one the cane tip cannot feel
pub struct HighObstacle;

impl GuidanceRule for HighObstacle {
    fn name(&self) -> &'static str {
        "high_obstacle"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn matches(&self, snapshot: &DecisionSnapshot) -> bool {
        snapshot.obstacle_high
    }

    fn apply(&mut self, _snapshot: &DecisionSnapshot) -> Instruction {
        Instruction::warning("attention, obstacle at head height, stop and lower your head")
            .immediate()
    }
}

/// Obstacle directly in front, inside the reaction envelope
pub struct ImmediateObstacleFront;

impl GuidanceRule for ImmediateObstacleFront {
    fn name(&self) -> &'static str {
        "immediate_obstacle_front"
    }

    fn priority(&self) -> i32 {
        80
    }

    fn matches(&self, snapshot: &DecisionSnapshot) -> bool {
        snapshot.front < IMMEDIATE_FRONT_M
    }

    fn apply(&mut self, snapshot: &DecisionSnapshot) -> Instruction {
        match pick_free_side(snapshot, IMMEDIATE_FREE_M) {
            Some(side) => {
                Instruction::guidance(format!("obstacle ahead, turn {} now", side.spoken()))
                    .with_follow_up(turn_action(side))
            }
            None => {
                Instruction::warning("attention, obstacle very close, stop").immediate()
            }
        }
    }
}

/// Front obstacle while navigating on course: propose a detour
pub struct ObstacleOnGpsRoute;

impl GuidanceRule for ObstacleOnGpsRoute {
    fn name(&self) -> &'static str {
        "obstacle_on_gps_route"
    }

    fn priority(&self) -> i32 {
        75
    }

    fn matches(&self, snapshot: &DecisionSnapshot) -> bool {
        snapshot.has_obstacle_front()
            && snapshot.has_active_destination()
            && snapshot
                .gps
                .heading_deviation
                .map_or(false, |d| d.abs() <= ON_ROUTE_DEVIATION_DEG)
    }

    fn apply(&mut self, snapshot: &DecisionSnapshot) -> Instruction {
        match pick_free_side(snapshot, DETOUR_FREE_M) {
            Some(side) => Instruction::guidance(format!(
                "obstacle on the route, turn {} to go around, then continue",
                side.spoken()
            ))
            .with_distance(DETOUR_LEG_M)
            .with_follow_up(FollowUpAction::Continue),
            None => {
                Instruction::warning("attention, the route is blocked, stop").immediate()
            }
        }
    }
}

/// Front obstacle with room to prepare
pub struct MediumObstacleFront;

impl GuidanceRule for MediumObstacleFront {
    fn name(&self) -> &'static str {
        "medium_obstacle_front"
    }

    fn priority(&self) -> i32 {
        70
    }

    fn matches(&self, snapshot: &DecisionSnapshot) -> bool {
        (IMMEDIATE_FRONT_M..MEDIUM_FRONT_M).contains(&snapshot.front)
    }

    fn apply(&mut self, snapshot: &DecisionSnapshot) -> Instruction {
        let side = pick_free_side(snapshot, IMMEDIATE_FREE_M).unwrap_or_else(|| wider_side(snapshot));
        let distance = (snapshot.front - 0.5).clamp(0.5, 1.5);

        Instruction::guidance(format!(
            "obstacle ahead, advance and prepare to turn {}",
            side.spoken()
        ))
        .with_distance(distance)
        .with_follow_up(turn_action(side))
    }
}

/// Obstacles brushing the sides
pub struct LateralObstacle;

impl GuidanceRule for LateralObstacle {
    fn name(&self) -> &'static str {
        "lateral_obstacle"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn matches(&self, snapshot: &DecisionSnapshot) -> bool {
        snapshot.has_obstacle_left() || snapshot.has_obstacle_right()
    }

    fn apply(&mut self, snapshot: &DecisionSnapshot) -> Instruction {
        match (snapshot.has_obstacle_left(), snapshot.has_obstacle_right()) {
            (true, true) => {
                Instruction::warning("attention, narrow passage, advance slowly straight ahead")
            }
            (true, false) => Instruction::warning(
                "obstacle close on your left side, keep to the right and continue",
            ),
            _ => Instruction::warning(
                "obstacle close on your right side, keep to the left and continue",
            ),
        }
    }
}
