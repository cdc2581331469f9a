//! Trajectory deviation rule.

use contracts::{DecisionSnapshot, FollowUpAction, Instruction};

use crate::rule::{GuidanceRule, Side};

/// Yaw magnitude beyond which the drift needs a back-track (degrees)
const STRONG_DEVIATION_DEG: f64 = 30.0;

/// Walking direction drifting away from straight ahead
///
/// A positive yaw is a clockwise drift; the correction turns the opposite
/// way.
pub struct TrajectoryDeviation;

impl TrajectoryDeviation {
    fn correction_side(snapshot: &DecisionSnapshot) -> Side {
        if snapshot.yaw > 0.0 {
            Side::Left
        } else {
            Side::Right
        }
    }
}

impl GuidanceRule for TrajectoryDeviation {
    fn name(&self) -> &'static str {
        "trajectory_deviation"
    }

    fn priority(&self) -> i32 {
        60
    }

    fn matches(&self, snapshot: &DecisionSnapshot) -> bool {
        snapshot.is_deviating()
    }

    fn apply(&mut self, snapshot: &DecisionSnapshot) -> Instruction {
        let side = Self::correction_side(snapshot);

        if snapshot.yaw.abs() > STRONG_DEVIATION_DEG {
            let action = match side {
                Side::Left => FollowUpAction::TurnLeft,
                Side::Right => FollowUpAction::TurnRight,
            };
            Instruction::correction(format!(
                "you drifted, return one meter back, then turn {}",
                side.spoken()
            ))
            .with_distance(1.0)
            .with_follow_up(action)
        } else {
            Instruction::correction(format!(
                "turn slightly {} to continue straight",
                side.spoken()
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{GpsContext, InstructionKind};

    fn snapshot(yaw: f64) -> DecisionSnapshot {
        DecisionSnapshot {
            front: 5.0,
            left: 2.5,
            right: 2.5,
            obstacle_high: false,
            water_detected: false,
            yaw,
            pitch: 0.0,
            roll: 0.0,
            timestamp_ms: 0,
            gps: GpsContext::default(),
        }
    }

    #[test]
    fn test_threshold() {
        let rule = TrajectoryDeviation;
        assert!(!rule.matches(&snapshot(15.0)));
        assert!(rule.matches(&snapshot(15.1)));
        assert!(rule.matches(&snapshot(-20.0)));
    }

    #[test]
    fn test_mild_drift_redress() {
        let mut rule = TrajectoryDeviation;
        let instruction = rule.apply(&snapshot(20.0));
        assert_eq!(instruction.kind, InstructionKind::Correction);
        // Clockwise drift corrects to the left
        assert!(instruction.message.contains("left"));
        assert!(instruction.distance_m.is_none());
    }

    #[test]
    fn test_strong_drift_backtracks() {
        let mut rule = TrajectoryDeviation;
        let instruction = rule.apply(&snapshot(-40.0));
        assert_eq!(instruction.kind, InstructionKind::Correction);
        assert!(instruction.message.contains("return"));
        assert_eq!(instruction.distance_m, Some(1.0));
        assert_eq!(instruction.follow_up, Some(FollowUpAction::TurnRight));
    }
}
