//! Default rule set.
//!
//! Priorities, top to bottom: HighObstacle 100, DestinationReached 95,
//! Water 90, ImmediateObstacleFront 80, ObstacleOnGpsRoute 75,
//! MediumObstacleFront 70, GpsLostDuringNavigation 65, TrajectoryDeviation
//! 60, LateralObstacle 50, WaypointReached 40, GpsNavigation 10,
//! ClearPath 0.

mod clear;
mod obstacle;
mod route;
mod trajectory;
mod water;

pub use clear::ClearPath;
pub use obstacle::{
    HighObstacle, ImmediateObstacleFront, LateralObstacle, MediumObstacleFront, ObstacleOnGpsRoute,
};
pub use route::{DestinationReached, GpsLostDuringNavigation, GpsNavigation, WaypointReached};
pub use trajectory::TrajectoryDeviation;
pub use water::Water;

use crate::rule::GuidanceRule;

/// The default priority-ordered rule set
pub fn default_rules() -> Vec<Box<dyn GuidanceRule>> {
    vec![
        Box::new(HighObstacle),
        Box::new(DestinationReached::default()),
        Box::new(Water),
        Box::new(ImmediateObstacleFront),
        Box::new(ObstacleOnGpsRoute),
        Box::new(MediumObstacleFront),
        Box::new(GpsLostDuringNavigation),
        Box::new(TrajectoryDeviation),
        Box::new(LateralObstacle),
        Box::new(WaypointReached::default()),
        Box::new(GpsNavigation),
        Box::new(ClearPath),
    ]
}
