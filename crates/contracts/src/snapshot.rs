//! DecisionSnapshot - Snapshot adapter output
//!
//! Flattened, decision-ready view consumed by the rule engine.

use serde::{Deserialize, Serialize};

/// Front obstacle predicate threshold (meters)
pub const FRONT_OBSTACLE_M: f64 = 1.5;
/// Lateral obstacle predicate threshold (meters)
pub const LATERAL_OBSTACLE_M: f64 = 0.8;
/// Trajectory deviation predicate threshold (degrees of yaw)
pub const DEVIATION_DEG: f64 = 15.0;
/// Off-course threshold (degrees of heading deviation)
pub const OFF_COURSE_DEG: f64 = 15.0;
/// Strongly off-course threshold (degrees of heading deviation)
pub const STRONG_OFF_COURSE_DEG: f64 = 45.0;
/// Waypoint proximity threshold (meters)
pub const NEAR_WAYPOINT_M: f64 = 15.0;
/// Destination proximity threshold (meters)
pub const NEAR_DESTINATION_M: f64 = 10.0;

/// GPS navigation context attached to a snapshot
///
/// All fields are `None` while no destination is active or no valid fix
/// has been observed. `signal_lost` is owned by the pipeline: it is set
/// after a run of consecutive invalid fixes during active navigation and
/// cleared by the next valid fix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpsContext {
    /// Initial great-circle bearing to the current waypoint (degrees, [0,360))
    pub target_bearing: Option<f64>,

    /// Signed angle between current heading and the target bearing, (-180,180]
    pub heading_deviation: Option<f64>,

    /// Remaining route distance to the final waypoint (meters)
    pub distance_to_destination: Option<f64>,

    /// Active destination display name
    pub destination_name: Option<String>,

    /// Distance to the current waypoint (meters)
    pub distance_to_next_waypoint: Option<f64>,

    /// Current waypoint display name
    pub next_waypoint_name: Option<String>,

    /// Consecutive-invalid-fix flag raised by the pipeline
    #[serde(default)]
    pub signal_lost: bool,
}

/// Decision-ready sensor snapshot
///
/// Distances default to a safe 10 m for directions the servo is not
/// currently sweeping; see the snapshot adapter for the mapping policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSnapshot {
    /// Forward clearance (meters)
    pub front: f64,

    /// Left clearance (meters)
    pub left: f64,

    /// Right clearance (meters)
    pub right: f64,

    /// Head-height obstacle detected
    pub obstacle_high: bool,

    /// Water hazard detected
    pub water_detected: bool,

    /// IMU yaw (degrees)
    pub yaw: f64,

    /// IMU pitch (degrees)
    pub pitch: f64,

    /// IMU roll (degrees)
    pub roll: f64,

    /// Source packet timestamp (milliseconds)
    pub timestamp_ms: u64,

    /// Navigation context
    pub gps: GpsContext,
}

impl DecisionSnapshot {
    /// Obstacle within the forward reaction envelope
    pub fn has_obstacle_front(&self) -> bool {
        self.front < FRONT_OBSTACLE_M
    }

    /// Obstacle close on the left side
    pub fn has_obstacle_left(&self) -> bool {
        self.left < LATERAL_OBSTACLE_M
    }

    /// Obstacle close on the right side
    pub fn has_obstacle_right(&self) -> bool {
        self.right < LATERAL_OBSTACLE_M
    }

    /// Walking direction drifting from straight ahead
    pub fn is_deviating(&self) -> bool {
        self.yaw.abs() > DEVIATION_DEG
    }

    /// A destination is loaded and navigation is active
    pub fn has_active_destination(&self) -> bool {
        self.gps.destination_name.is_some()
    }

    /// Heading deviates from the route bearing
    pub fn is_off_course(&self) -> bool {
        self.gps
            .heading_deviation
            .map_or(false, |d| d.abs() > OFF_COURSE_DEG)
    }

    /// Heading deviates strongly from the route bearing
    pub fn is_strongly_off_course(&self) -> bool {
        self.gps
            .heading_deviation
            .map_or(false, |d| d.abs() > STRONG_OFF_COURSE_DEG)
    }

    /// Within arrival range of the current waypoint
    pub fn is_near_waypoint(&self) -> bool {
        self.gps
            .distance_to_next_waypoint
            .map_or(false, |d| d < NEAR_WAYPOINT_M)
    }

    /// Within arrival range of the final destination
    pub fn is_near_destination(&self) -> bool {
        self.gps
            .distance_to_destination
            .map_or(false, |d| d < NEAR_DESTINATION_M)
    }
}
