//! Mock cane implementation
//!
//! Implements `PacketSource`, generates simulated cane telemetry.
//! Used for testing and development without paired hardware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use contracts::{
    CanePacket, CaneTransport, ConnectionCallback, CoreError, FixKind, GpsFix, ImuReading,
    ObstaclePair, PacketCallback, PacketSource, WaterReading,
};
use tracing::{debug, trace};

/// Degrees of latitude per meter on the WGS-84 sphere
const DEG_PER_METER: f64 = 1.0 / 111_320.0;

/// Servo sweep positions, one step per packet
const SWEEP_PATTERN: [f64; 16] = [
    -60.0, -45.0, -30.0, -15.0, 0.0, 15.0, 30.0, 45.0, 60.0, 45.0, 30.0, 15.0, 0.0, -15.0, -30.0,
    -45.0,
];

/// Simulated walk scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockScenario {
    /// Open sidewalk, nothing in the way
    #[default]
    ClearWalk,
    /// Ground obstacle closing in, occasional head-height obstacle
    ObstacleCourse,
    /// Dry start, then a puddle crossing
    WaterHazard,
    /// Steady walk along a 45-degree bearing with yaw wobble
    CityRoute,
}

/// Mock cane configuration
#[derive(Debug, Clone)]
pub struct MockCaneConfig {
    /// Packet cadence (Hz)
    pub frequency_hz: f64,
    /// Scenario to play
    pub scenario: MockScenario,
    /// Simulated GPS start coordinates
    pub start_coordinates: (f64, f64),
}

impl Default for MockCaneConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 10.0,
            scenario: MockScenario::ClearWalk,
            start_coordinates: (4.0511, 9.7679),
        }
    }
}

/// Mock cane
///
/// Implements `PacketSource`, generates deterministic scenario telemetry at
/// the configured cadence in a background thread. Packets are delivered
/// through the callback, matching the notify-driven BLE transport behavior.
pub struct MockCane {
    source_name: String,
    config: MockCaneConfig,
    listening: Arc<AtomicBool>,
    connected: Arc<AtomicBool>,
    connection_callback: Arc<Mutex<Option<ConnectionCallback>>>,
}

impl MockCane {
    /// Create a new mock cane
    pub fn new(source_name: impl Into<String>, config: MockCaneConfig) -> Self {
        Self {
            source_name: source_name.into(),
            config,
            listening: Arc::new(AtomicBool::new(false)),
            connected: Arc::new(AtomicBool::new(false)),
            connection_callback: Arc::new(Mutex::new(None)),
        }
    }

    fn notify_connection(&self, connected: bool) {
        if let Ok(guard) = self.connection_callback.lock() {
            if let Some(callback) = guard.as_ref() {
                callback(connected);
            }
        }
    }

    /// Create a mock cane with default configuration
    pub fn with_defaults(source_name: impl Into<String>) -> Self {
        Self::new(source_name, MockCaneConfig::default())
    }

    /// Create a mock cane playing the given scenario
    pub fn with_scenario(source_name: impl Into<String>, scenario: MockScenario) -> Self {
        Self::new(
            source_name,
            MockCaneConfig {
                scenario,
                ..Default::default()
            },
        )
    }

    /// Generate the packet for one frame of the scenario
    fn generate_packet(config: &MockCaneConfig, frame_id: u64) -> CanePacket {
        let now_ms = epoch_ms();
        let i = frame_id as usize;
        let servo_angle = SWEEP_PATTERN[i % SWEEP_PATTERN.len()];

        let (imu, obstacles, water) = match config.scenario {
            MockScenario::ClearWalk => (
                ImuReading::new(wobble(i, 4.0), -1.0, 0.5),
                ObstaclePair::new(None, Some(8.0 + wobble(i, 0.04)), servo_angle),
                WaterReading::new(6.0, Some(240)),
            ),
            MockScenario::ObstacleCourse => {
                // Ground obstacle ramps from 6 m down to 0.5 m, then resets
                let ramp = 6.0 - 0.15 * ((i % 38) as f64);
                let lower = ramp.max(0.5);
                // A head-height obstacle shows up periodically
                let upper = if (i % 90) < 10 { Some(1.2) } else { None };
                (
                    ImuReading::new(wobble(i, 3.0), -2.0, 1.0),
                    ObstaclePair::new(upper, Some(lower), servo_angle),
                    WaterReading::new(8.0, Some(320)),
                )
            }
            MockScenario::WaterHazard => {
                // Humidity triangle wave: dry, puddle, dry again
                let phase = (i % 60) as f64;
                let humidity = if phase < 30.0 {
                    10.0 + phase * 2.6
                } else {
                    88.0 - (phase - 30.0) * 2.6
                };
                (
                    ImuReading::new(wobble(i, 2.0), -1.5, 0.0),
                    ObstaclePair::new(None, Some(6.0), servo_angle),
                    WaterReading::new(humidity.clamp(0.0, 100.0), None),
                )
            }
            MockScenario::CityRoute => (
                ImuReading::new(wobble(i, 10.0), -1.0, 0.5),
                ObstaclePair::new(None, Some(7.0 + wobble(i, 0.04)), servo_angle),
                WaterReading::new(12.0, Some(480)),
            ),
        };

        let gps = Self::generate_fix(config, frame_id);

        CanePacket {
            timestamp_ms: now_ms,
            imu,
            obstacles,
            water,
            gps,
        }
    }

    /// Simulated walking GPS track
    fn generate_fix(config: &MockCaneConfig, frame_id: u64) -> GpsFix {
        let (start_lat, start_lon) = config.start_coordinates;
        let meters_walked = 1.4 * frame_id as f64 / config.frequency_hz;

        let (heading, dlat, dlon) = match config.scenario {
            // CityRoute walks northeast, everything else walks due north
            MockScenario::CityRoute => {
                let leg = meters_walked * std::f64::consts::FRAC_1_SQRT_2;
                (45.0, leg * DEG_PER_METER, leg * DEG_PER_METER)
            }
            _ => (0.0, meters_walked * DEG_PER_METER, 0.0),
        };

        GpsFix {
            latitude: Some(start_lat + dlat),
            longitude: Some(start_lon + dlon),
            altitude: Some(13.0),
            speed: Some(5.0),
            heading: Some(heading),
            satellites: Some(8),
            hdop: Some(1.1),
            gps_timestamp: Some(epoch_ms()),
            fix_kind: FixKind::ThreeD,
        }
    }
}

impl PacketSource for MockCane {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn listen(&self, callback: PacketCallback) {
        // Idempotent: if already listening, don't start again
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let source_name = self.source_name.clone();
        let config = self.config.clone();
        let listening = self.listening.clone();

        let interval = Duration::from_secs_f64(1.0 / config.frequency_hz);

        thread::spawn(move || {
            let mut frame_id: u64 = 0;

            debug!(
                source = %source_name,
                scenario = ?config.scenario,
                frequency_hz = config.frequency_hz,
                "mock cane started"
            );

            while listening.load(Ordering::Relaxed) {
                let packet = MockCane::generate_packet(&config, frame_id);
                frame_id += 1;

                callback(packet);

                trace!(source = %source_name, frame_id, "mock packet sent");

                thread::sleep(interval);
            }

            debug!(source = %source_name, "mock cane stopped");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

impl CaneTransport for MockCane {
    async fn connect(&mut self) -> Result<(), CoreError> {
        if !self.connected.swap(true, Ordering::SeqCst) {
            debug!(source = %self.source_name, "mock link connected");
            self.notify_connection(true);
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), CoreError> {
        self.stop();
        if self.connected.swap(false, Ordering::SeqCst) {
            debug!(source = %self.source_name, "mock link disconnected");
            self.notify_connection(false);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn on_connection_change(&self, callback: ConnectionCallback) {
        if let Ok(mut guard) = self.connection_callback.lock() {
            *guard = Some(callback);
        }
    }
}

/// Milliseconds since the Unix epoch
pub(crate) fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Small deterministic oscillation around zero
fn wobble(i: usize, amplitude: f64) -> f64 {
    (i as f64 * 0.7).sin() * amplitude
}
