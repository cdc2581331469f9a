//! # Ingestion
//!
//! 手杖数据包接入层。
//!
//! 负责：
//! - `PacketSource` 回调 → 有界通道桥接（背压处理）
//! - BLE notify 载荷解码（bytes → JSON → `CanePacket`）
//! - Mock / 回放数据源
//!
//! ## 使用示例
//!
//! ```ignore
//! use ingestion::{CaneIngest, MockCane, MockCaneConfig};
//!
//! let mut ingest = CaneIngest::new(100);
//! ingest.register_source(Box::new(MockCane::with_defaults("OPEN-EYES")));
//! ingest.start();
//!
//! let rx = ingest.take_receiver().unwrap();
//! while let Ok(packet) = rx.recv().await {
//!     // feed the pipeline
//! }
//! ```

mod config;
pub mod frame;
mod ingest;
mod mock;
mod replay;

pub use config::{BackpressureConfig, LinkMetrics, LinkMetricsSnapshot};
pub use ingest::CaneIngest;
pub use mock::{MockCane, MockCaneConfig, MockScenario};
pub use replay::{ReplayCane, ReplayConfig};

// Re-export contracts types commonly used together with this crate
pub use contracts::{CanePacket, DropPolicy, PacketCallback, PacketSource};
