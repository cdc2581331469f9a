//! 背压配置和链路指标
//!
//! 手杖链路是单源低频流（默认 10 Hz 上报），与多传感器采集不同，
//! 这里关心的不是逐源吞吐，而是"链路还活着吗、桥接有没有憋住"。
//! 指标据此组织：过桥计数、泄流计数、队列深度高水位、最近活跃时间。

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

pub use contracts::DropPolicy;

/// 背压配置
#[derive(Debug, Clone)]
pub struct BackpressureConfig {
    /// 桥接通道容量
    pub channel_capacity: usize,

    /// 通道满时的泄流策略
    pub drop_policy: DropPolicy,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 100,
            drop_policy: DropPolicy::DropNewest,
        }
    }
}

impl BackpressureConfig {
    /// 创建新的背压配置
    pub fn new(channel_capacity: usize, drop_policy: DropPolicy) -> Self {
        Self {
            channel_capacity,
            drop_policy,
        }
    }

    /// 按手杖上报频率配置容量
    ///
    /// 缓冲约两秒的数据包；决策侧短暂卡顿不丢包，长期落后交给
    /// 泄流策略。下限 16，避免极低频率下容量退化到个位数。
    pub fn for_cadence_hz(cadence_hz: f64) -> Self {
        let capacity = (cadence_hz.max(0.0) * 2.0).ceil() as usize;
        Self {
            channel_capacity: capacity.max(16),
            drop_policy: DropPolicy::default(),
        }
    }
}

/// 链路指标
///
/// 由桥接回调在传输线程上更新，管道侧只读快照。
#[derive(Debug, Default)]
pub struct LinkMetrics {
    /// 过桥的数据包总数
    packets_bridged: AtomicU64,

    /// 背压泄流掉的数据包总数
    packets_shed: AtomicU64,

    /// 队列深度高水位
    peak_queue_depth: AtomicUsize,

    /// 最近一个过桥包的时刻（毫秒，0 表示链路从未活跃）
    last_bridged_ms: AtomicU64,
}

impl LinkMetrics {
    /// 创建新的指标实例
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个包过桥，并刷新链路活跃时间
    pub fn record_bridged(&self, now_ms: u64) {
        self.packets_bridged.fetch_add(1, Ordering::Relaxed);
        self.last_bridged_ms.store(now_ms, Ordering::Relaxed);
    }

    /// 记录一个被泄流的包
    pub fn record_shed(&self) {
        self.packets_shed.fetch_add(1, Ordering::Relaxed);
    }

    /// 上报当前队列深度，只保留高水位
    pub fn note_queue_depth(&self, depth: usize) {
        self.peak_queue_depth.fetch_max(depth, Ordering::Relaxed);
    }

    /// 链路静默时长（毫秒）
    ///
    /// 链路从未活跃过时为 None。配合新鲜度阈值可以在数据断流时
    /// 触发"连接丢失"告警。
    pub fn silence_ms(&self, now_ms: u64) -> Option<u64> {
        match self.last_bridged_ms.load(Ordering::Relaxed) {
            0 => None,
            last => Some(now_ms.saturating_sub(last)),
        }
    }

    /// 获取快照
    pub fn snapshot(&self) -> LinkMetricsSnapshot {
        let last = self.last_bridged_ms.load(Ordering::Relaxed);
        LinkMetricsSnapshot {
            packets_bridged: self.packets_bridged.load(Ordering::Relaxed),
            packets_shed: self.packets_shed.load(Ordering::Relaxed),
            peak_queue_depth: self.peak_queue_depth.load(Ordering::Relaxed),
            last_bridged_ms: (last != 0).then_some(last),
        }
    }
}

/// 链路指标快照
#[derive(Debug, Clone, Default)]
pub struct LinkMetricsSnapshot {
    /// 过桥的数据包总数
    pub packets_bridged: u64,

    /// 背压泄流掉的数据包总数
    pub packets_shed: u64,

    /// 队列深度高水位
    pub peak_queue_depth: usize,

    /// 最近一个过桥包的时刻
    pub last_bridged_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_from_cadence() {
        // 10 Hz: two seconds of packets
        assert_eq!(BackpressureConfig::for_cadence_hz(10.0).channel_capacity, 20);
        // Very slow links still get a workable queue
        assert_eq!(BackpressureConfig::for_cadence_hz(1.0).channel_capacity, 16);
        assert_eq!(BackpressureConfig::for_cadence_hz(0.0).channel_capacity, 16);
    }

    #[test]
    fn test_queue_depth_keeps_high_water() {
        let metrics = LinkMetrics::new();
        metrics.note_queue_depth(3);
        metrics.note_queue_depth(9);
        metrics.note_queue_depth(4);
        assert_eq!(metrics.snapshot().peak_queue_depth, 9);
    }

    #[test]
    fn test_silence_tracking() {
        let metrics = LinkMetrics::new();
        assert_eq!(metrics.silence_ms(5_000), None);

        metrics.record_bridged(4_000);
        assert_eq!(metrics.silence_ms(5_000), Some(1_000));
        assert_eq!(metrics.snapshot().last_bridged_ms, Some(4_000));
    }

    #[test]
    fn test_counters_accumulate() {
        let metrics = LinkMetrics::new();
        metrics.record_bridged(100);
        metrics.record_bridged(200);
        metrics.record_shed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.packets_bridged, 2);
        assert_eq!(snapshot.packets_shed, 1);
    }
}
