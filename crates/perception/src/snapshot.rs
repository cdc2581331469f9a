//! Snapshot adapter.
//!
//! Fuses a temporal state and the navigation context into the flattened
//! `DecisionSnapshot` consumed by the rule engine.

use contracts::{CoreError, DecisionSnapshot, GpsContext, SnapshotMode, SweepZone};

use crate::state::TemporalState;

/// Safe default clearance for directions not currently swept (meters)
pub const DEFAULT_CLEARANCE_M: f64 = 10.0;
/// Head-height obstacle threshold for the snapshot flag (meters)
pub const HIGH_OBSTACLE_M: f64 = 1.5;
/// Per-m/s distance shrink factor in enhanced mode
const ENHANCE_FACTOR_PER_MPS: f64 = 0.2;
/// Maximum enhanced-mode distance shrink
const ENHANCE_MAX_SHRINK: f64 = 0.3;

/// Assemble the decision snapshot for one tick
///
/// The servo-mounted lower sensor samples one direction at a time; its
/// reading lands in the field for the zone currently swept and the other
/// directions fall back to a safe clearance:
///
/// | servo zone | lower reading fills | front |
/// |---|---|---|
/// | center | `front` | lower |
/// | right  | `right` | upper |
/// | left   | `left`  | upper |
///
/// Returns `StalePacket` when the state is no longer fresh and
/// `InvalidState` when an IMU component is not finite; the caller skips
/// the decision for that tick.
pub fn build_snapshot(
    state: &TemporalState,
    gps: GpsContext,
    mode: SnapshotMode,
    now_ms: u64,
) -> Result<DecisionSnapshot, CoreError> {
    let packet = &state.packet;

    if !packet.is_fresh(now_ms) {
        return Err(CoreError::StalePacket {
            age_ms: packet.age_ms(now_ms),
            max_age_ms: contracts::FRESH_MS,
        });
    }
    if !packet.imu.is_finite() {
        return Err(CoreError::invalid_state("non-finite imu component"));
    }

    let upper = packet.obstacles.upper.unwrap_or(DEFAULT_CLEARANCE_M);
    let lower = packet.obstacles.lower.unwrap_or(DEFAULT_CLEARANCE_M);

    let (mut front, mut left, mut right) = match packet.obstacles.zone() {
        SweepZone::Center => (lower, DEFAULT_CLEARANCE_M, DEFAULT_CLEARANCE_M),
        SweepZone::Right => (upper, DEFAULT_CLEARANCE_M, lower),
        SweepZone::Left => (upper, lower, DEFAULT_CLEARANCE_M),
    };

    if mode == SnapshotMode::Enhanced && state.is_approaching_obstacle() {
        // Shorten perceived distances while closing fast so the rules get
        // lead time; the shrink is bounded and keeps distances >= 0.
        let shrink = (state.approach_speed * ENHANCE_FACTOR_PER_MPS).clamp(0.0, ENHANCE_MAX_SHRINK);
        let factor = 1.0 - shrink;
        front *= factor;
        left *= factor;
        right *= factor;
    }

    // The upper sensor stays the critical one for the tick on which its
    // reading drops out from inside the envelope (positive upper delta with
    // a null current reading); close-range ultrasonic dropout must not
    // clear a head-height warning.
    let upper_close = packet
        .obstacles
        .upper
        .map_or(false, |u| u < HIGH_OBSTACLE_M);
    let upper_vanished_close = packet.obstacles.upper.is_none()
        && state
            .obstacle_delta
            .upper
            .map_or(false, |d| d > 0.0 && d < HIGH_OBSTACLE_M);
    let obstacle_high = upper_close || upper_vanished_close;

    let water_detected = packet.water.is_danger() || packet.water.is_submerged();

    Ok(DecisionSnapshot {
        front,
        left,
        right,
        obstacle_high,
        water_detected,
        yaw: packet.imu.yaw,
        pitch: packet.imu.pitch,
        roll: packet.imu.roll,
        timestamp_ms: packet.timestamp_ms,
        gps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CanePacket, GpsFix, ImuReading, ObstaclePair, WaterReading};

    fn state_with(obstacles: ObstaclePair, now_ms: u64) -> TemporalState {
        let packet = CanePacket {
            timestamp_ms: now_ms,
            imu: ImuReading::new(5.0, -1.0, 0.5),
            obstacles,
            water: WaterReading::new(10.0, None),
            gps: GpsFix::default(),
        };
        TemporalState::from_packet(packet, None, now_ms)
    }

    fn snapshot(state: &TemporalState) -> DecisionSnapshot {
        build_snapshot(state, GpsContext::default(), SnapshotMode::Basic, state.created_at_ms)
            .unwrap()
    }

    #[test]
    fn test_center_sweep_fills_front() {
        let state = state_with(ObstaclePair::new(Some(3.0), Some(1.2), 0.0), 1000);
        let snap = snapshot(&state);
        assert_eq!(snap.front, 1.2);
        assert_eq!(snap.left, DEFAULT_CLEARANCE_M);
        assert_eq!(snap.right, DEFAULT_CLEARANCE_M);
    }

    #[test]
    fn test_right_sweep_fills_right_and_upper_covers_front() {
        let state = state_with(ObstaclePair::new(Some(3.0), Some(0.7), 45.0), 1000);
        let snap = snapshot(&state);
        assert_eq!(snap.right, 0.7);
        assert_eq!(snap.front, 3.0);
        assert_eq!(snap.left, DEFAULT_CLEARANCE_M);
    }

    #[test]
    fn test_left_sweep_with_missing_readings_defaults() {
        let state = state_with(ObstaclePair::new(None, None, -45.0), 1000);
        let snap = snapshot(&state);
        assert_eq!(snap.left, DEFAULT_CLEARANCE_M);
        assert_eq!(snap.front, DEFAULT_CLEARANCE_M);
    }

    #[test]
    fn test_high_obstacle_flag() {
        let state = state_with(ObstaclePair::new(Some(1.4), Some(5.0), 0.0), 1000);
        assert!(snapshot(&state).obstacle_high);

        let clear = state_with(ObstaclePair::new(Some(1.6), Some(5.0), 0.0), 1000);
        assert!(!snapshot(&clear).obstacle_high);
    }

    fn follow_up_state(previous: &TemporalState, upper: Option<f64>, now_ms: u64) -> TemporalState {
        let packet = CanePacket {
            timestamp_ms: now_ms,
            imu: ImuReading::new(5.0, -1.0, 0.5),
            obstacles: ObstaclePair::new(upper, Some(5.0), 0.0),
            water: WaterReading::new(10.0, None),
            gps: GpsFix::default(),
        };
        TemporalState::from_packet(packet, Some(previous), now_ms)
    }

    #[test]
    fn test_high_obstacle_holds_through_close_dropout() {
        let close = state_with(ObstaclePair::new(Some(1.2), Some(5.0), 0.0), 1000);

        // Reading vanishes while inside the envelope: the flag holds
        let dropout = follow_up_state(&close, None, 1100);
        assert!(snapshot(&dropout).obstacle_high);

        // A second consecutive null clears it
        let settled = follow_up_state(&dropout, None, 1200);
        assert!(!snapshot(&settled).obstacle_high);
    }

    #[test]
    fn test_high_obstacle_not_held_for_distant_dropout() {
        let distant = state_with(ObstaclePair::new(Some(3.0), Some(5.0), 0.0), 1000);
        let dropout = follow_up_state(&distant, None, 1100);
        assert!(!snapshot(&dropout).obstacle_high);
    }

    #[test]
    fn test_water_flag() {
        let mut packet = CanePacket {
            timestamp_ms: 1000,
            imu: ImuReading::default(),
            obstacles: ObstaclePair::default(),
            water: WaterReading::new(70.0, None),
            gps: GpsFix::default(),
        };
        let state = TemporalState::from_packet(packet, None, 1000);
        assert!(snapshot(&state).water_detected);

        packet.water = WaterReading::new(30.0, None);
        let state = TemporalState::from_packet(packet, None, 1000);
        assert!(!snapshot(&state).water_detected);
    }

    #[test]
    fn test_enhanced_mode_shrinks_distances_while_closing() {
        let first = state_with(ObstaclePair::new(None, Some(3.0), 0.0), 1000);
        let packet = CanePacket {
            timestamp_ms: 2000,
            imu: ImuReading::default(),
            obstacles: ObstaclePair::new(None, Some(2.0), 0.0),
            water: WaterReading::default(),
            gps: GpsFix::default(),
        };
        // 1 m/s closing rate
        let state = TemporalState::from_packet(packet, Some(&first), 2000);

        let enhanced =
            build_snapshot(&state, GpsContext::default(), SnapshotMode::Enhanced, 2000).unwrap();
        let basic =
            build_snapshot(&state, GpsContext::default(), SnapshotMode::Basic, 2000).unwrap();

        // 1 m/s * 0.2 = 0.2 shrink
        assert!((enhanced.front - basic.front * 0.8).abs() < 1e-9);
        assert!(enhanced.front >= 0.0);
        assert!((enhanced.left - basic.left * 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_enhanced_shrink_is_capped() {
        let first = state_with(ObstaclePair::new(None, Some(9.0), 0.0), 1000);
        let packet = CanePacket {
            timestamp_ms: 1100,
            imu: ImuReading::default(),
            obstacles: ObstaclePair::new(None, Some(4.0), 0.0),
            water: WaterReading::default(),
            gps: GpsFix::default(),
        };
        // 50 m/s apparent closing rate, shrink must cap at 0.3
        let state = TemporalState::from_packet(packet, Some(&first), 1100);

        let enhanced =
            build_snapshot(&state, GpsContext::default(), SnapshotMode::Enhanced, 1100).unwrap();
        assert!((enhanced.front - 4.0 * 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_stale_state_is_rejected() {
        let state = state_with(ObstaclePair::default(), 1000);
        let err = build_snapshot(&state, GpsContext::default(), SnapshotMode::Basic, 2500)
            .unwrap_err();
        assert!(matches!(err, CoreError::StalePacket { .. }));
    }

    #[test]
    fn test_nan_imu_is_rejected() {
        let mut state = state_with(ObstaclePair::default(), 1000);
        state.packet.imu.roll = f64::NAN;
        let err = build_snapshot(&state, GpsContext::default(), SnapshotMode::Basic, 1000)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));
    }

    #[test]
    fn test_gps_context_is_carried() {
        let state = state_with(ObstaclePair::default(), 1000);
        let gps = GpsContext {
            destination_name: Some("market".into()),
            heading_deviation: Some(-20.0),
            ..Default::default()
        };
        let snap =
            build_snapshot(&state, gps.clone(), SnapshotMode::Basic, 1000).unwrap();
        assert_eq!(snap.gps, gps);
        assert!(snap.has_active_destination());
        assert!(snap.is_off_course());
    }
}
