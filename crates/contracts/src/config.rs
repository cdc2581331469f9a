//! Pipeline configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};

/// Full pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Streaming filter configuration
    #[serde(default)]
    pub filter: FilterConfig,

    /// Packet freshness windows
    #[serde(default)]
    pub freshness: FreshnessConfig,

    /// Route navigator configuration
    #[serde(default)]
    pub navigator: NavigatorConfig,

    /// Guidance executor configuration
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// GPS loss detection configuration
    #[serde(default)]
    pub gps_loss: GpsLossConfig,

    /// Channel capacities and overflow policy
    #[serde(default)]
    pub channels: ChannelConfig,

    /// Snapshot adapter mode
    #[serde(default)]
    pub snapshot_mode: SnapshotMode,
}

/// Streaming filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Sliding window capacity, clamped to [2, 20]
    pub window_size: usize,

    /// Obstacle anomaly rejection gate (meters)
    pub anomaly_gate_m: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            anomaly_gate_m: 1.5,
        }
    }
}

impl FilterConfig {
    /// Window capacity with bounds applied
    pub fn effective_window(&self) -> usize {
        self.window_size.clamp(2, 20)
    }
}

/// Packet freshness windows (milliseconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreshnessConfig {
    /// Below this age a packet may drive a decision
    pub fresh_ms: u64,
    /// Above this age a packet raises the danger level
    pub stale_ms: u64,
    /// Above this age a packet is rejected outright
    pub max_age_ms: u64,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            fresh_ms: 1000,
            stale_ms: 2000,
            max_age_ms: 5000,
        }
    }
}

/// Route navigator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigatorConfig {
    /// Waypoint arrival radius (meters)
    pub reached_threshold_m: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            reached_threshold_m: 10.0,
        }
    }
}

/// Guidance executor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Assumed walking speed for displacement estimation (m/s)
    pub walking_speed_mps: f64,

    /// Speed attenuation applied on slopes
    pub tilt_attenuation: f64,

    /// Pitch magnitude above which the attenuation applies (degrees)
    pub tilt_threshold_deg: f64,

    /// Yaw drift above which the heading cosine factor applies (degrees)
    pub heading_cos_threshold_deg: f64,

    /// Displacement silence before a stuck warning (milliseconds)
    pub stuck_timeout_ms: u64,

    /// Displacement tracker tick cadence (milliseconds)
    pub tick_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            walking_speed_mps: 1.4,
            tilt_attenuation: 0.8,
            tilt_threshold_deg: 10.0,
            heading_cos_threshold_deg: 15.0,
            stuck_timeout_ms: 5000,
            tick_ms: 100,
        }
    }
}

/// GPS loss detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpsLossConfig {
    /// Consecutive invalid fixes before navigation is declared suspended
    pub invalid_fix_threshold: u32,
}

impl Default for GpsLossConfig {
    fn default() -> Self {
        Self {
            invalid_fix_threshold: 3,
        }
    }
}

/// Drop policy when a bounded channel is full
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Drop the incoming packet
    #[default]
    DropNewest,
    /// Drop the oldest queued packet
    DropOldest,
}

/// Channel capacities and overflow policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Transport → pipeline channel capacity
    pub ingest_capacity: usize,

    /// State broadcast channel capacity
    pub state_capacity: usize,

    /// Pipeline → guidance channel capacity
    pub guidance_capacity: usize,

    /// Overflow policy on the ingest channel
    #[serde(default)]
    pub drop_policy: DropPolicy,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            ingest_capacity: 100,
            state_capacity: 64,
            guidance_capacity: 32,
            drop_policy: DropPolicy::default(),
        }
    }
}

/// Snapshot adapter mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotMode {
    /// Raw filtered distances
    Basic,
    /// Distances shortened while closing on an obstacle
    #[default]
    Enhanced,
}
