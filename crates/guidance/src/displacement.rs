//! Displacement tracker.
//!
//! Estimates the distance walked since an instruction was spoken. No
//! odometry is available, so the estimate is time-based with attenuation
//! for slopes and heading drift; an externally supplied distance can take
//! over when real odometry arrives.

use contracts::{DecisionSnapshot, ExecutorConfig};

/// Dead-reckoning displacement tracker
///
/// The tracked distance is non-decreasing while the tracker is active:
/// every increment is clamped to be non-negative.
#[derive(Debug, Clone)]
pub struct DisplacementTracker {
    start_yaw: f64,
    target_m: f64,
    tracked_m: f64,
    last_update_ms: u64,
    stuck_reported: bool,
}

impl DisplacementTracker {
    /// Start tracking toward a target distance
    pub fn start(target_m: f64, snapshot: &DecisionSnapshot, now_ms: u64) -> Self {
        Self {
            start_yaw: snapshot.yaw,
            target_m,
            tracked_m: 0.0,
            last_update_ms: now_ms,
            stuck_reported: false,
        }
    }

    /// Advance the estimate by one tick
    ///
    /// `estimate = walking_speed × Δt × attenuation`, attenuated on slopes
    /// (|pitch| above the tilt threshold) and scaled by the cosine of the
    /// yaw drift once it exceeds the heading threshold.
    pub fn update(&mut self, now_ms: u64, current: &DecisionSnapshot, config: &ExecutorConfig) {
        let dt_ms = now_ms.saturating_sub(self.last_update_ms);
        if dt_ms == 0 {
            return;
        }
        self.last_update_ms = now_ms;

        let dt_s = dt_ms as f64 / 1000.0;
        let attenuation = if current.pitch.abs() > config.tilt_threshold_deg {
            config.tilt_attenuation
        } else {
            1.0
        };

        let mut increment = config.walking_speed_mps * dt_s * attenuation;

        let drift = yaw_drift_deg(self.start_yaw, current.yaw);
        if drift.abs() > config.heading_cos_threshold_deg {
            increment *= drift.to_radians().cos();
        }

        self.tracked_m += increment.max(0.0);
    }

    /// Fold in an externally measured distance (future odometry input)
    pub fn apply_external_distance(&mut self, distance_m: f64, now_ms: u64) {
        self.tracked_m += distance_m.max(0.0);
        self.last_update_ms = now_ms;
    }

    /// Distance tracked so far (meters)
    pub fn tracked_m(&self) -> f64 {
        self.tracked_m
    }

    /// Target distance (meters)
    pub fn target_m(&self) -> f64 {
        self.target_m
    }

    /// The target distance has been covered
    pub fn is_complete(&self) -> bool {
        self.tracked_m >= self.target_m
    }

    /// No update for longer than the stuck timeout
    ///
    /// Reported at most once per tracker; non-fatal.
    pub fn check_stuck(&mut self, now_ms: u64, config: &ExecutorConfig) -> bool {
        if self.stuck_reported || self.is_complete() {
            return false;
        }
        if now_ms.saturating_sub(self.last_update_ms) > config.stuck_timeout_ms {
            self.stuck_reported = true;
            return true;
        }
        false
    }
}

/// Signed yaw drift, normalized to (-180, 180]
fn yaw_drift_deg(start: f64, current: f64) -> f64 {
    let mut delta = (current - start) % 360.0;
    if delta <= -180.0 {
        delta += 360.0;
    } else if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}
