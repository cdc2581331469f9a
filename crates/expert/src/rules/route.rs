//! GPS navigation rules.

use contracts::{DecisionSnapshot, FollowUpAction, Instruction};

use crate::rule::{gps_correction_side, GuidanceRule, Side};

/// Arrival at the final destination; announced once per approach
#[derive(Default)]
pub struct DestinationReached {
    latched: bool,
}

impl GuidanceRule for DestinationReached {
    fn name(&self) -> &'static str {
        "destination_reached"
    }

    fn priority(&self) -> i32 {
        95
    }

    fn matches(&self, snapshot: &DecisionSnapshot) -> bool {
        !self.latched && snapshot.is_near_destination()
    }

    fn apply(&mut self, snapshot: &DecisionSnapshot) -> Instruction {
        self.latched = true;
        let name = snapshot
            .gps
            .destination_name
            .as_deref()
            .unwrap_or("your destination");

        Instruction::guidance(format!("you have arrived at {name}, stop here"))
            .with_follow_up(FollowUpAction::Stop)
    }

    fn refresh(&mut self, snapshot: &DecisionSnapshot) {
        // Re-arm once the walker is no longer hovering at the threshold
        if !snapshot.is_near_destination() {
            self.latched = false;
        }
    }
}

/// Arrival at an intermediate waypoint; announced once per approach
#[derive(Default)]
pub struct WaypointReached {
    latched: bool,
}

impl GuidanceRule for WaypointReached {
    fn name(&self) -> &'static str {
        "waypoint_reached"
    }

    fn priority(&self) -> i32 {
        40
    }

    fn matches(&self, snapshot: &DecisionSnapshot) -> bool {
        !self.latched && snapshot.is_near_waypoint() && !snapshot.is_near_destination()
    }

    fn apply(&mut self, snapshot: &DecisionSnapshot) -> Instruction {
        self.latched = true;
        let message = match snapshot.gps.next_waypoint_name.as_deref() {
            Some(name) => format!("{name} reached, continue straight"),
            None => "waypoint reached, continue straight".to_string(),
        };

        Instruction::guidance(message).with_follow_up(FollowUpAction::Continue)
    }

    fn refresh(&mut self, snapshot: &DecisionSnapshot) {
        if !snapshot.is_near_waypoint() {
            self.latched = false;
        }
    }
}

/// GPS signal lost while a destination is active
///
/// Driven by the pipeline's consecutive-invalid-fix counter through the
/// snapshot flag.
pub struct GpsLostDuringNavigation;

impl GuidanceRule for GpsLostDuringNavigation {
    fn name(&self) -> &'static str {
        "gps_lost_during_navigation"
    }

    fn priority(&self) -> i32 {
        65
    }

    fn matches(&self, snapshot: &DecisionSnapshot) -> bool {
        snapshot.gps.signal_lost && snapshot.has_active_destination()
    }

    fn apply(&mut self, _snapshot: &DecisionSnapshot) -> Instruction {
        Instruction::warning(
            "attention, positioning signal lost, navigation suspended, advance carefully",
        )
    }
}

/// Course correction toward the route bearing
pub struct GpsNavigation;

impl GuidanceRule for GpsNavigation {
    fn name(&self) -> &'static str {
        "gps_navigation"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn matches(&self, snapshot: &DecisionSnapshot) -> bool {
        snapshot.has_active_destination()
            && snapshot.is_off_course()
            && !snapshot.has_obstacle_front()
    }

    fn apply(&mut self, snapshot: &DecisionSnapshot) -> Instruction {
        let side = gps_correction_side(snapshot).unwrap_or(Side::Left);

        if snapshot.is_strongly_off_course() {
            Instruction::guidance(format!(
                "you are drifting strongly, turn {} to return to the route",
                side.spoken()
            ))
        } else {
            Instruction::guidance(format!(
                "turn slightly {} to stay on the route",
                side.spoken()
            ))
        }
    }
}
