//! Temporal state derivation.
//!
//! Each state owns its filtered packet and is derived eagerly against the
//! previous state; the pipeline retains only the immediately previous state
//! for one cycle, so no linked structure is needed.

use contracts::CanePacket;

/// Rotation speed above which the user is spinning rather than walking (deg/s)
pub const FAST_ROTATION_DEG_S: f64 = 30.0;
/// Obstacle delta below which a direction counts as closing (meters)
pub const APPROACH_DELTA_M: f64 = 0.1;
/// Closing rate that forces an immediate alert (m/s)
pub const IMMEDIATE_APPROACH_MPS: f64 = 0.5;
/// Danger level that forces an immediate alert
pub const IMMEDIATE_DANGER_LEVEL: f64 = 1.5;

/// Per-axis IMU delta, shortest-path normalized
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImuDelta {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl ImuDelta {
    /// Largest absolute axis delta (degrees)
    pub fn max_abs(&self) -> f64 {
        self.yaw.abs().max(self.pitch.abs()).max(self.roll.abs())
    }
}

/// Signed obstacle distance change per channel
///
/// Null transitions use the signed rule: an appearing reading (`null → v`)
/// yields `-v` (treated as an approach from out of range), a disappearing
/// reading (`v → null`) yields `+v` (recession out of range).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObstacleDelta {
    pub upper: Option<f64>,
    pub lower: Option<f64>,
}

/// Temporal sensor state
///
/// Holds the latest filtered packet plus derivations against the previous
/// state. The creation timestamp is captured independently of the sensor
/// timestamp (the pipeline may hand over delayed packets).
#[derive(Debug, Clone)]
pub struct TemporalState {
    /// Filtered packet backing this state
    pub packet: CanePacket,

    /// Handheld clock at derivation time (milliseconds)
    pub created_at_ms: u64,

    /// IMU delta against the previous state
    pub imu_delta: Option<ImuDelta>,

    /// Rotation speed (deg/s); `None` without a previous state or when the
    /// time delta is not positive
    pub rotation_speed: Option<f64>,

    /// Obstacle distance deltas against the previous state
    pub obstacle_delta: ObstacleDelta,

    /// Fastest closing rate across channels (m/s, >= 0)
    pub approach_speed: f64,

    /// Composite danger level; deliberately unclamped so emergencies can
    /// escalate past 1
    pub danger_level: f64,

    /// Alert priority band, 0 (calm) to 3 (critical)
    pub alert_priority: u8,

    /// Packet was already stale at derivation time
    pub stale: bool,
}

impl TemporalState {
    /// Derive a state from a filtered packet
    pub fn from_packet(packet: CanePacket, previous: Option<&TemporalState>, now_ms: u64) -> Self {
        let stale = packet.is_stale(now_ms);

        let imu_delta = previous.map(|prev| ImuDelta {
            yaw: angle_delta_deg(prev.packet.imu.yaw, packet.imu.yaw),
            pitch: angle_delta_deg(prev.packet.imu.pitch, packet.imu.pitch),
            roll: angle_delta_deg(prev.packet.imu.roll, packet.imu.roll),
        });

        let time_diff_s = previous.and_then(|prev| {
            let diff = now_ms.saturating_sub(prev.created_at_ms);
            (diff > 0).then_some(diff as f64 / 1000.0)
        });

        let rotation_speed = match (imu_delta, time_diff_s) {
            (Some(delta), Some(dt)) => Some(delta.max_abs() / dt),
            _ => None,
        };

        let obstacle_delta = previous
            .map(|prev| ObstacleDelta {
                upper: signed_delta(prev.packet.obstacles.upper, packet.obstacles.upper),
                lower: signed_delta(prev.packet.obstacles.lower, packet.obstacles.lower),
            })
            .unwrap_or_default();

        let approach_speed = time_diff_s
            .map(|dt| {
                let closing = |delta: Option<f64>| delta.map_or(0.0, |d| (-d).max(0.0));
                (closing(obstacle_delta.upper).max(closing(obstacle_delta.lower))) / dt
            })
            .unwrap_or(0.0);

        let rotating_fast = rotation_speed.map_or(false, |v| v > FAST_ROTATION_DEG_S);

        let mut danger_level = packet.obstacles.danger_score();
        if stale {
            danger_level += 0.5;
        }
        danger_level += approach_speed * 3.0;
        if rotating_fast {
            danger_level += 0.3;
        }

        let alert_priority = match danger_level {
            d if d < 0.25 => 0,
            d if d < 0.6 => 1,
            d if d < 1.0 => 2,
            _ => 3,
        };

        Self {
            packet,
            created_at_ms: now_ms,
            imu_delta,
            rotation_speed,
            obstacle_delta,
            approach_speed,
            danger_level,
            alert_priority,
            stale,
        }
    }

    /// Rotating faster than a walking turn
    pub fn is_rotating_fast(&self) -> bool {
        self.rotation_speed
            .map_or(false, |v| v > FAST_ROTATION_DEG_S)
    }

    /// Any obstacle channel closed by more than the approach threshold
    pub fn is_approaching_obstacle(&self) -> bool {
        let closing = |delta: Option<f64>| delta.map_or(false, |d| d < -APPROACH_DELTA_M);
        closing(self.obstacle_delta.upper) || closing(self.obstacle_delta.lower)
    }

    /// The situation cannot wait for the normal utterance queue
    ///
    /// The cane itself signals an emergency through a dangerous tilt
    /// (falling or dropped cane); fast closing and escalated danger do the
    /// same on the handheld side.
    pub fn requires_immediate_alert(&self) -> bool {
        self.packet.imu.is_dangerous_tilt()
            || self.danger_level > IMMEDIATE_DANGER_LEVEL
            || self.approach_speed > IMMEDIATE_APPROACH_MPS
    }
}

/// Shortest-path angle delta, normalized to (-180, 180]
pub fn angle_delta_deg(from: f64, to: f64) -> f64 {
    let mut delta = (to - from) % 360.0;
    if delta <= -180.0 {
        delta += 360.0;
    } else if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

/// Signed obstacle delta with null transitions
fn signed_delta(previous: Option<f64>, current: Option<f64>) -> Option<f64> {
    match (previous, current) {
        (None, None) => None,
        (None, Some(v)) => Some(-v),
        (Some(v), None) => Some(v),
        (Some(a), Some(b)) => Some(b - a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{GpsFix, ImuReading, ObstaclePair, WaterReading};

    fn packet(timestamp_ms: u64, yaw: f64, lower: Option<f64>) -> CanePacket {
        CanePacket {
            timestamp_ms,
            imu: ImuReading::new(yaw, 0.0, 0.0),
            obstacles: ObstaclePair::new(None, lower, 0.0),
            water: WaterReading::default(),
            gps: GpsFix::default(),
        }
    }

    #[test]
    fn test_angle_delta_shortest_path() {
        assert_eq!(angle_delta_deg(170.0, -170.0), 20.0);
        assert_eq!(angle_delta_deg(-170.0, 170.0), -20.0);
        assert_eq!(angle_delta_deg(0.0, 180.0), 180.0);
        assert_eq!(angle_delta_deg(10.0, 5.0), -5.0);

        // Property: |delta| <= 180 over the whole domain
        let mut a = -180.0;
        while a <= 180.0 {
            let mut b = -180.0;
            while b <= 180.0 {
                assert!(angle_delta_deg(a, b).abs() <= 180.0, "a={a} b={b}");
                b += 7.3;
            }
            a += 7.3;
        }
    }

    #[test]
    fn test_first_state_has_no_derivations() {
        let state = TemporalState::from_packet(packet(1000, 0.0, Some(2.0)), None, 1000);
        assert!(state.imu_delta.is_none());
        assert!(state.rotation_speed.is_none());
        assert_eq!(state.obstacle_delta, ObstacleDelta::default());
        assert_eq!(state.approach_speed, 0.0);
    }

    #[test]
    fn test_rotation_speed() {
        let first = TemporalState::from_packet(packet(1000, 0.0, None), None, 1000);
        let second = TemporalState::from_packet(packet(1500, 20.0, None), Some(&first), 1500);

        // 20 degrees over 0.5 s
        assert!((second.rotation_speed.unwrap() - 40.0).abs() < 1e-9);
        assert!(second.is_rotating_fast());
    }

    #[test]
    fn test_obstacle_delta_null_rules() {
        let first = TemporalState::from_packet(packet(1000, 0.0, Some(2.0)), None, 1000);

        // value -> null: disappearance is a positive (receding) delta
        let gone = TemporalState::from_packet(packet(1100, 0.0, None), Some(&first), 1100);
        assert_eq!(gone.obstacle_delta.lower, Some(2.0));

        // null -> value: appearance is a negative (approaching) delta
        let back = TemporalState::from_packet(packet(1200, 0.0, Some(1.5)), Some(&gone), 1200);
        assert_eq!(back.obstacle_delta.lower, Some(-1.5));
    }

    #[test]
    fn test_approach_speed_and_immediate_alert() {
        let first = TemporalState::from_packet(packet(1000, 0.0, Some(3.0)), None, 1000);
        // 0.8 m closer after 1 s
        let second = TemporalState::from_packet(packet(2000, 0.0, Some(2.2)), Some(&first), 2000);

        assert!((second.approach_speed - 0.8).abs() < 1e-9);
        assert!(second.is_approaching_obstacle());
        assert!(second.requires_immediate_alert());
    }

    #[test]
    fn test_receding_obstacle_is_not_approach() {
        let first = TemporalState::from_packet(packet(1000, 0.0, Some(2.0)), None, 1000);
        let second = TemporalState::from_packet(packet(2000, 0.0, Some(3.0)), Some(&first), 2000);

        assert_eq!(second.approach_speed, 0.0);
        assert!(!second.is_approaching_obstacle());
    }

    #[test]
    fn test_stale_packet_raises_danger() {
        let fresh = TemporalState::from_packet(packet(10_000, 0.0, None), None, 10_100);
        let stale = TemporalState::from_packet(packet(10_000, 0.0, None), None, 12_500);

        assert!(!fresh.stale);
        assert!(stale.stale);
        assert!((stale.danger_level - fresh.danger_level - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_danger_level_unclamped() {
        let first = TemporalState::from_packet(packet(1000, 0.0, Some(3.0)), None, 1000);
        // Massive closing rate: 2.5 m in 0.1 s
        let second = TemporalState::from_packet(packet(1100, 0.0, Some(0.5)), Some(&first), 1100);

        assert!(second.danger_level > 1.0);
        assert_eq!(second.alert_priority, 3);
    }

    #[test]
    fn test_dangerous_tilt_forces_immediate() {
        let mut tilted = packet(1000, 0.0, None);
        tilted.imu.pitch = 70.0;
        let state = TemporalState::from_packet(tilted, None, 1000);
        assert!(state.requires_immediate_alert());
    }
}
