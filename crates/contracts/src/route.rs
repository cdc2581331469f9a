//! Route types - Destination JSON contract
//!
//! Ordered waypoint routes as produced by the companion app. Immutable
//! after load; validation lives in the navigation crate.

use serde::{Deserialize, Serialize};

/// Waypoint role within a route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointKind {
    Start,
    #[default]
    Intermediate,
    Destination,
}

/// Transport mode the route was computed for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    #[default]
    Walking,
    Cycling,
    Transit,
    Driving,
}

/// A named geographic point in an ordered route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Latitude (degrees)
    pub latitude: f64,

    /// Longitude (degrees)
    pub longitude: f64,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Optional spoken instruction attached to the waypoint
    #[serde(default)]
    pub instruction: Option<String>,

    /// Role; first/last waypoints are implicitly start/destination
    /// when omitted (normalized by the route loader)
    #[serde(rename = "type", default)]
    pub kind: WaypointKind,
}

impl Waypoint {
    /// Create a bare intermediate waypoint
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            name: None,
            instruction: None,
            kind: WaypointKind::Intermediate,
        }
    }

    /// Coordinate pair
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// An ordered route to a destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Display name
    pub name: String,

    /// Transport mode
    #[serde(rename = "transportMode", default)]
    pub transport_mode: TransportMode,

    /// Planned total distance, if the planner provided one (meters)
    #[serde(rename = "totalDistanceMeters", default)]
    pub total_distance_meters: Option<f64>,

    /// Planned travel time, if the planner provided one (seconds)
    #[serde(rename = "estimatedTimeSeconds", default)]
    pub estimated_time_seconds: Option<u64>,

    /// Ordered waypoints, at least two
    pub waypoints: Vec<Waypoint>,
}

impl Destination {
    /// Final waypoint of the route
    pub fn final_waypoint(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }

    /// Number of route legs
    pub fn leg_count(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }
}
