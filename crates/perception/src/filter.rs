//! Streaming packet filter.

use contracts::{CanePacket, FilterConfig};
use tracing::instrument;

use crate::window::{ObstacleChannel, SampleWindow};

/// Moving-average filter over the packet stream
///
/// Maintains one window per IMU axis (pushed atomically), one obstacle
/// channel per ultrasonic sensor, and one window for the water humidity.
/// Latency is roughly `window × cadence`; the obstacle channels additionally
/// reject glitch samples through the anomaly gate.
#[derive(Debug)]
pub struct StreamingFilter {
    yaw: SampleWindow,
    pitch: SampleWindow,
    roll: SampleWindow,
    upper: ObstacleChannel,
    lower: ObstacleChannel,
    humidity: SampleWindow,
    window_size: usize,
}

impl StreamingFilter {
    /// Create a filter from configuration (window clamped to [2, 20])
    pub fn new(config: &FilterConfig) -> Self {
        let capacity = config.effective_window();
        Self {
            yaw: SampleWindow::new(capacity),
            pitch: SampleWindow::new(capacity),
            roll: SampleWindow::new(capacity),
            upper: ObstacleChannel::new(capacity, config.anomaly_gate_m),
            lower: ObstacleChannel::new(capacity, config.anomaly_gate_m),
            humidity: SampleWindow::new(capacity),
            window_size: capacity,
        }
    }

    /// Filter one packet
    ///
    /// Returns a packet whose IMU, obstacle and humidity values are the
    /// mean over the current windows. While a window holds fewer than two
    /// samples the raw value passes through. GPS and the servo angle are
    /// not filtered.
    #[instrument(level = "trace", name = "filter_packet", skip(self, packet))]
    pub fn filter(&mut self, mut packet: CanePacket) -> CanePacket {
        packet.imu.yaw = push_scalar(&mut self.yaw, packet.imu.yaw);
        packet.imu.pitch = push_scalar(&mut self.pitch, packet.imu.pitch);
        packet.imu.roll = push_scalar(&mut self.roll, packet.imu.roll);

        packet.obstacles.upper = self.upper.push(packet.obstacles.upper);
        packet.obstacles.lower = self.lower.push(packet.obstacles.lower);

        packet.water.humidity = push_scalar(&mut self.humidity, packet.water.humidity);

        packet
    }

    /// Clear all windows
    pub fn reset(&mut self) {
        self.yaw.clear();
        self.pitch.clear();
        self.roll.clear();
        self.upper.clear();
        self.lower.clear();
        self.humidity.clear();
    }

    /// Every window holds a full complement of samples
    pub fn is_warmed_up(&self) -> bool {
        self.yaw.is_full() && self.upper.is_full() && self.lower.is_full() && self.humidity.is_full()
    }

    /// Effective window capacity
    pub fn window_size(&self) -> usize {
        self.window_size
    }
}

/// Push a scalar sample and return the windowed mean (raw during warm-up)
fn push_scalar(window: &mut SampleWindow, value: f64) -> f64 {
    let warming_up = window.len() < 2;
    window.push(value);
    if warming_up {
        value
    } else {
        window.mean().unwrap_or(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{GpsFix, ImuReading, ObstaclePair, WaterReading};

    fn config() -> FilterConfig {
        FilterConfig::default()
    }

    fn packet(yaw: f64, upper: Option<f64>, lower: Option<f64>) -> CanePacket {
        CanePacket {
            timestamp_ms: 1000,
            imu: ImuReading::new(yaw, 0.0, 0.0),
            obstacles: ObstaclePair::new(upper, lower, 0.0),
            water: WaterReading::new(20.0, None),
            gps: GpsFix::default(),
        }
    }

    #[test]
    fn test_constant_input_is_idempotent() {
        let mut filter = StreamingFilter::new(&config());
        let input = packet(12.0, Some(2.0), Some(1.5));

        let mut output = input;
        for _ in 0..8 {
            output = filter.filter(input);
        }

        assert!((output.imu.yaw - 12.0).abs() < 1e-9);
        assert!((output.obstacles.upper.unwrap() - 2.0).abs() < 1e-9);
        assert!((output.obstacles.lower.unwrap() - 1.5).abs() < 1e-9);
        assert!((output.water.humidity - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_anomaly_does_not_shift_output() {
        let mut filter = StreamingFilter::new(&config());
        for _ in 0..5 {
            filter.filter(packet(0.0, None, Some(1.0)));
        }

        let output = filter.filter(packet(0.0, None, Some(3.0)));
        let lower = output.obstacles.lower.unwrap();
        assert!(
            (lower - 1.0).abs() <= 0.1,
            "glitch shifted output to {lower}"
        );
    }

    #[test]
    fn test_warm_up_passes_raw_values() {
        let mut filter = StreamingFilter::new(&config());
        let output = filter.filter(packet(30.0, Some(4.0), None));
        assert_eq!(output.imu.yaw, 30.0);
        assert_eq!(output.obstacles.upper, Some(4.0));
        assert!(!filter.is_warmed_up());
    }

    #[test]
    fn test_warm_up_completes_after_full_window() {
        let mut filter = StreamingFilter::new(&config());
        for _ in 0..5 {
            filter.filter(packet(0.0, Some(2.0), Some(2.0)));
        }
        assert!(filter.is_warmed_up());
    }

    #[test]
    fn test_reset_clears_windows() {
        let mut filter = StreamingFilter::new(&config());
        for _ in 0..5 {
            filter.filter(packet(10.0, Some(2.0), Some(2.0)));
        }
        filter.reset();
        assert!(!filter.is_warmed_up());

        // After reset the first value passes through raw again
        let output = filter.filter(packet(50.0, None, None));
        assert_eq!(output.imu.yaw, 50.0);
    }

    #[test]
    fn test_smoothing_averages_noise() {
        let mut filter = StreamingFilter::new(&config());
        filter.filter(packet(0.0, None, Some(2.0)));
        filter.filter(packet(2.0, None, Some(2.2)));
        let output = filter.filter(packet(-2.0, None, Some(1.8)));
        // Mean of {0, 2, -2} and {2.0, 2.2, 1.8}
        assert!(output.imu.yaw.abs() < 1e-9);
        assert!((output.obstacles.lower.unwrap() - 2.0).abs() < 1e-9);
    }
}
