//! # Guidance
//!
//! 语音引导执行器。
//!
//! 负责：
//! - 指令队列（优先级 + 抢占）
//! - 位移跟踪与后续动作播报
//! - 语音协作方输出（独立 worker 任务）
//!
//! ## 使用示例
//!
//! ```ignore
//! use guidance::{GuidanceHandle, TracingSpeech};
//!
//! let handle = GuidanceHandle::spawn(TracingSpeech::new("voice"), config, 32);
//! handle.try_send(instruction, snapshot);
//! // ...
//! handle.shutdown().await;
//! ```

mod displacement;
mod executor;
mod handle;
mod metrics;
mod speech;

pub use displacement::DisplacementTracker;
pub use executor::{ExecutorState, GuidanceExecutor};
pub use handle::GuidanceHandle;
pub use metrics::{ExecutorMetrics, ExecutorMetricsSnapshot};
pub use speech::TracingSpeech;

// Re-export contracts types commonly used together with this crate
pub use contracts::{ExecutorConfig, Instruction, SpeechPriority, SpeechSynthesizer};

/// Milliseconds since the Unix epoch
pub(crate) fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
