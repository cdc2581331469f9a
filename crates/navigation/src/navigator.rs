//! Waypoint sequencing and navigation context.

use contracts::{CoreError, Destination, GpsContext, GpsFix, NavigatorConfig, Waypoint};
use tracing::{debug, info, instrument};

use crate::geo;
use crate::validator;

/// Navigation progress event
#[derive(Debug, Clone, PartialEq)]
pub enum RouteEvent {
    /// An intermediate waypoint was reached
    WaypointReached { index: usize, waypoint: Waypoint },
    /// The final waypoint was reached
    DestinationReached { name: String },
}

/// Waypoint route navigator
///
/// Owns the waypoint index; destinations are immutable after load. The
/// navigator is mutated only from the pipeline task, readers get a
/// `GpsContext` snapshot by value.
#[derive(Debug)]
pub struct RouteNavigator {
    destination: Option<Destination>,
    current_index: usize,
    current_position: Option<(f64, f64)>,
    reached_threshold_m: f64,
}

impl RouteNavigator {
    /// Create a navigator with the given configuration
    pub fn new(config: NavigatorConfig) -> Self {
        Self {
            destination: None,
            current_index: 0,
            current_position: None,
            reached_threshold_m: config.reached_threshold_m,
        }
    }

    /// Load a destination, replacing any active route
    ///
    /// # Errors
    /// Returns a navigation error when the destination fails validation;
    /// the previously active route (if any) stays loaded.
    #[instrument(name = "navigator_load_destination", skip(self, destination), fields(name = %destination.name))]
    pub fn load_destination(&mut self, destination: Destination) -> Result<(), CoreError> {
        validator::validate(&destination)?;

        info!(
            name = %destination.name,
            waypoints = destination.waypoints.len(),
            "destination loaded"
        );

        self.destination = Some(destination);
        self.current_index = 0;
        Ok(())
    }

    /// Drop the active route
    pub fn clear_destination(&mut self) {
        if let Some(destination) = self.destination.take() {
            debug!(name = %destination.name, "destination cleared");
        }
        self.current_index = 0;
    }

    /// Feed a GPS fix; advances the waypoint index on threshold crossing
    ///
    /// Invalid fixes are ignored (the pipeline tracks loss separately).
    #[instrument(name = "navigator_update_position", level = "debug", skip(self, fix))]
    pub fn update_position(&mut self, fix: &GpsFix) -> Option<RouteEvent> {
        let position = fix.coordinates()?;
        self.current_position = Some(position);

        let destination = self.destination.as_ref()?;
        let waypoint = destination.waypoints.get(self.current_index)?;

        let distance = geo::haversine_distance_m(position, waypoint.coordinates());
        if distance > self.reached_threshold_m {
            return None;
        }

        let reached_index = self.current_index;
        let reached = waypoint.clone();
        self.current_index += 1;

        if self.current_index >= destination.waypoints.len() {
            info!(name = %destination.name, "destination reached");
            return Some(RouteEvent::DestinationReached {
                name: destination.name.clone(),
            });
        }

        debug!(index = reached_index, "waypoint reached");
        Some(RouteEvent::WaypointReached {
            index: reached_index,
            waypoint: reached,
        })
    }

    /// A destination is loaded
    pub fn has_active_destination(&self) -> bool {
        self.destination.is_some()
    }

    /// Active destination name
    pub fn destination_name(&self) -> Option<&str> {
        self.destination.as_ref().map(|d| d.name.as_str())
    }

    /// Waypoint currently navigated toward
    pub fn current_waypoint(&self) -> Option<&Waypoint> {
        self.destination
            .as_ref()
            .and_then(|d| d.waypoints.get(self.current_index))
    }

    /// Initial bearing to the current waypoint, degrees [0, 360)
    pub fn target_bearing(&self) -> Option<f64> {
        let position = self.current_position?;
        let waypoint = self.current_waypoint()?;
        Some(geo::initial_bearing_deg(position, waypoint.coordinates()))
    }

    /// Distance to the current waypoint (meters)
    pub fn distance_to_current_waypoint(&self) -> Option<f64> {
        let position = self.current_position?;
        let waypoint = self.current_waypoint()?;
        Some(geo::haversine_distance_m(position, waypoint.coordinates()))
    }

    /// Remaining route distance to the final waypoint (meters)
    ///
    /// Sum of the segment to the current waypoint plus the remaining
    /// inter-waypoint segments. Once the route is complete this is the
    /// straight distance to the final waypoint.
    pub fn distance_to_destination(&self) -> Option<f64> {
        let position = self.current_position?;
        let destination = self.destination.as_ref()?;
        let waypoints = &destination.waypoints;

        if self.current_index >= waypoints.len() {
            let last = waypoints.last()?;
            return Some(geo::haversine_distance_m(position, last.coordinates()));
        }

        let mut total =
            geo::haversine_distance_m(position, waypoints[self.current_index].coordinates());
        for pair in waypoints[self.current_index..].windows(2) {
            total += geo::haversine_distance_m(pair[0].coordinates(), pair[1].coordinates());
        }
        Some(total)
    }

    /// Route completion, [0, 1]
    pub fn progress(&self) -> f64 {
        let Some(destination) = self.destination.as_ref() else {
            return 0.0;
        };

        let total = route_length_m(destination);
        if total <= 0.0 {
            return 0.0;
        }

        match self.distance_to_destination() {
            Some(remaining) => ((total - remaining) / total).clamp(0.0, 1.0),
            None => 0.0,
        }
    }

    /// Navigation context for the snapshot adapter
    ///
    /// `heading_deg` is the walker's current heading (GPS heading when
    /// available, IMU yaw otherwise); `signal_lost` is the pipeline's
    /// consecutive-invalid-fix flag.
    pub fn context(&self, heading_deg: Option<f64>, signal_lost: bool) -> GpsContext {
        let target_bearing = self.target_bearing();
        let heading_deviation = match (heading_deg, target_bearing) {
            (Some(heading), Some(bearing)) => Some(geo::signed_angle_deg(bearing, heading)),
            _ => None,
        };

        GpsContext {
            target_bearing,
            heading_deviation,
            distance_to_destination: self.distance_to_destination(),
            destination_name: self.destination_name().map(String::from),
            distance_to_next_waypoint: self.distance_to_current_waypoint(),
            next_waypoint_name: self
                .current_waypoint()
                .and_then(|w| w.name.clone()),
            signal_lost,
        }
    }
}

/// Total route length over all legs (meters)
fn route_length_m(destination: &Destination) -> f64 {
    destination
        .waypoints
        .windows(2)
        .map(|pair| geo::haversine_distance_m(pair[0].coordinates(), pair[1].coordinates()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{FixKind, TransportMode, WaypointKind};

    fn waypoint(lat: f64, lon: f64, name: &str) -> Waypoint {
        Waypoint {
            latitude: lat,
            longitude: lon,
            name: Some(name.to_string()),
            instruction: None,
            kind: WaypointKind::Intermediate,
        }
    }

    fn test_destination() -> Destination {
        // Three waypoints going due north, ~111 m apart
        Destination {
            name: "test route".into(),
            transport_mode: TransportMode::Walking,
            total_distance_meters: None,
            estimated_time_seconds: None,
            waypoints: vec![
                waypoint(4.0500, 9.7679, "start"),
                waypoint(4.0510, 9.7679, "middle"),
                waypoint(4.0520, 9.7679, "end"),
            ],
        }
    }

    fn fix_at(lat: f64, lon: f64) -> GpsFix {
        GpsFix {
            latitude: Some(lat),
            longitude: Some(lon),
            heading: Some(0.0),
            satellites: Some(8),
            hdop: Some(1.0),
            fix_kind: FixKind::ThreeD,
            ..Default::default()
        }
    }

    fn navigator_with_route() -> RouteNavigator {
        let mut navigator = RouteNavigator::new(NavigatorConfig::default());
        navigator.load_destination(test_destination()).unwrap();
        navigator
    }

    #[test]
    fn test_load_rejects_invalid_destination() {
        let mut navigator = RouteNavigator::new(NavigatorConfig::default());
        let mut destination = test_destination();
        destination.waypoints.truncate(1);

        let err = navigator.load_destination(destination).unwrap_err();
        assert!(matches!(err, CoreError::Navigation { .. }));
        assert!(!navigator.has_active_destination());
    }

    #[test]
    fn test_invalid_fix_is_ignored() {
        let mut navigator = navigator_with_route();
        let event = navigator.update_position(&GpsFix::default());
        assert!(event.is_none());
        assert!(navigator.target_bearing().is_none());
    }

    #[test]
    fn test_waypoint_advancement_and_arrival() {
        let mut navigator = navigator_with_route();

        // Far south of the first waypoint: no event
        assert!(navigator.update_position(&fix_at(4.0400, 9.7679)).is_none());

        // On the first waypoint
        let event = navigator.update_position(&fix_at(4.0500, 9.7679)).unwrap();
        assert!(matches!(event, RouteEvent::WaypointReached { index: 0, .. }));

        // On the second
        let event = navigator.update_position(&fix_at(4.0510, 9.7679)).unwrap();
        assert!(matches!(event, RouteEvent::WaypointReached { index: 1, .. }));

        // On the last: destination reached
        let event = navigator.update_position(&fix_at(4.0520, 9.7679)).unwrap();
        assert!(matches!(event, RouteEvent::DestinationReached { .. }));
        assert!((navigator.progress() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_target_bearing_due_north() {
        let mut navigator = navigator_with_route();
        navigator.update_position(&fix_at(4.0400, 9.7679));
        let bearing = navigator.target_bearing().unwrap();
        assert!(bearing.abs() < 1.0 || (bearing - 360.0).abs() < 1.0);
    }

    #[test]
    fn test_distance_to_destination_sums_segments() {
        let mut navigator = navigator_with_route();
        navigator.update_position(&fix_at(4.0490, 9.7679));

        // ~111 m to wp0 + ~111 m + ~111 m remaining legs
        let total = navigator.distance_to_destination().unwrap();
        assert!((total - 334.0).abs() < 5.0, "got {total}");
    }

    #[test]
    fn test_progress_advances() {
        let mut navigator = navigator_with_route();
        navigator.update_position(&fix_at(4.0500, 9.7679));
        let early = navigator.progress();

        navigator.update_position(&fix_at(4.0510, 9.7679));
        let later = navigator.progress();
        assert!(later > early);
    }

    #[test]
    fn test_context_heading_deviation() {
        let mut navigator = navigator_with_route();
        navigator.update_position(&fix_at(4.0400, 9.7679));

        // Target bearing ~0 (north); walking east means +90 deviation
        let context = navigator.context(Some(90.0), false);
        let deviation = context.heading_deviation.unwrap();
        assert!((deviation - 90.0).abs() < 1.0, "got {deviation}");

        assert_eq!(context.destination_name.as_deref(), Some("test route"));
        assert_eq!(context.next_waypoint_name.as_deref(), Some("start"));
        assert!(!context.signal_lost);
    }

    #[test]
    fn test_context_without_destination_is_empty() {
        let navigator = RouteNavigator::new(NavigatorConfig::default());
        let context = navigator.context(Some(10.0), false);
        assert_eq!(context, GpsContext::default());
    }
}
