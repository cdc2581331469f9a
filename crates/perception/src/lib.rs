//! # Perception
//!
//! 传感器流预处理引擎。
//!
//! 负责：
//! - 滑动窗口滤波 + 异常值拒收
//! - 时序状态推导（角度差、接近速度、危险评分）
//! - 决策快照装配（舵机扫描方向映射）
//!
//! ## 使用示例
//!
//! ```ignore
//! use perception::{StreamingFilter, TemporalState, build_snapshot};
//!
//! let mut filter = StreamingFilter::new(config.filter);
//! let filtered = filter.filter(packet);
//! let state = TemporalState::from_packet(filtered, previous.as_ref(), now_ms);
//!
//! if let Ok(snapshot) = build_snapshot(&state, gps_context, mode, now_ms) {
//!     // feed the rule engine
//! }
//! ```

mod filter;
mod snapshot;
mod state;
mod window;

pub use filter::StreamingFilter;
pub use snapshot::build_snapshot;
pub use state::{angle_delta_deg, ImuDelta, ObstacleDelta, TemporalState};
pub use window::{ObstacleChannel, SampleWindow};

// Re-export contracts types commonly used together with this crate
pub use contracts::{FilterConfig, SnapshotMode};
