//! # Pipeline
//!
//! 决策管道编排器。
//!
//! 数据流：ingest → validate → filter → state → GPS update → snapshot →
//! evaluate → guidance。所有决策阶段运行在单个任务上，严格按 FIFO 逐包
//! 处理；数据源、语音合成与位移定时器运行在各自任务上，通过有界通道
//! 通信。
//!
//! ## 使用示例
//!
//! ```ignore
//! use pipeline::{GuidancePipeline, PipelineOptions};
//!
//! let pipeline = GuidancePipeline::new(config, Some(navigator));
//! let stop = pipeline.stop_handle();
//! let stats = pipeline.run(packet_rx, guidance_handle, PipelineOptions::default()).await;
//! stats.print_summary();
//! ```

mod processor;
mod runner;
mod stats;

pub use processor::{PacketProcessor, ProcessorCounters, TickOutput};
pub use runner::{GuidancePipeline, PipelineOptions, PipelineStopHandle};
pub use stats::PipelineStats;

// Re-export contracts types commonly used together with this crate
pub use contracts::PipelineConfig;

/// Milliseconds since the Unix epoch
pub(crate) fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
