//! 决策管道指标收集模块
//!
//! 基于引擎求值结果收集和统计决策管道的运行指标。

use contracts::{Instruction, SpeechPriority};
use metrics::{counter, gauge, histogram};

/// 记录一次规则求值
///
/// 每个决策 tick 调用一次；`instruction` 为 None 表示被去重抑制。
pub fn record_decision(rule_name: &str, instruction: Option<&Instruction>) {
    counter!("open_eyes_decisions_total", "rule" => rule_name.to_string()).increment(1);

    match instruction {
        Some(instruction) => {
            counter!(
                "open_eyes_instructions_total",
                "rule" => rule_name.to_string(),
                "kind" => format!("{:?}", instruction.kind)
            )
            .increment(1);

            if instruction.immediate {
                counter!("open_eyes_instructions_immediate_total").increment(1);
            }
        }
        None => {
            counter!("open_eyes_instructions_deduplicated_total").increment(1);
        }
    }
}

/// 记录数据包接收
pub fn record_packet_received(source: &str) {
    counter!(
        "open_eyes_packets_received_total",
        "source" => source.to_string()
    )
    .increment(1);
}

/// 记录数据包丢弃（校验失败）
pub fn record_packet_error(reason: &str) {
    counter!(
        "open_eyes_packets_errored_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// 记录背压丢包
pub fn record_packet_dropped() {
    counter!("open_eyes_packets_dropped_total").increment(1);
}

/// 记录语音播报
pub fn record_instruction_spoken(priority: SpeechPriority, duration_ms: u64) {
    counter!(
        "open_eyes_utterances_total",
        "priority" => format!("{priority:?}")
    )
    .increment(1);
    histogram!("open_eyes_utterance_duration_ms").record(duration_ms as f64);
}

/// 记录导航事件
pub fn record_route_event(kind: &str) {
    counter!(
        "open_eyes_route_events_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// 记录 GPS 信号丢失
pub fn record_gps_loss() {
    counter!("open_eyes_gps_loss_total").increment(1);
}

/// 记录当前危险评分
pub fn record_danger_level(level: f64) {
    gauge!("open_eyes_danger_level").set(level);
    histogram!("open_eyes_danger_level_hist").record(level);
}

/// 决策指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DecisionMetricsAggregator {
    /// 决策总数
    pub total_decisions: u64,

    /// 播报总数
    pub total_emitted: u64,

    /// 被去重抑制的数量
    pub total_deduplicated: u64,

    /// 抢占播报数量
    pub total_immediate: u64,

    /// 各规则命中次数
    pub rule_counts: std::collections::HashMap<String, u64>,

    /// 危险评分统计
    pub danger_stats: RunningStats,

    /// 接近速度统计
    pub approach_stats: RunningStats,
}

impl DecisionMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(
        &mut self,
        rule_name: &str,
        instruction: Option<&Instruction>,
        danger_level: f64,
        approach_speed: f64,
    ) {
        self.total_decisions += 1;
        *self.rule_counts.entry(rule_name.to_string()).or_insert(0) += 1;

        match instruction {
            Some(instruction) => {
                self.total_emitted += 1;
                if instruction.immediate {
                    self.total_immediate += 1;
                }
            }
            None => self.total_deduplicated += 1,
        }

        self.danger_stats.observe(danger_level);
        self.approach_stats.observe(approach_speed);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_decisions: self.total_decisions,
            total_emitted: self.total_emitted,
            total_deduplicated: self.total_deduplicated,
            total_immediate: self.total_immediate,
            dedup_rate: if self.total_decisions > 0 {
                self.total_deduplicated as f64 / self.total_decisions as f64 * 100.0
            } else {
                0.0
            },
            danger_level: StatLine::from(&self.danger_stats),
            approach_speed: StatLine::from(&self.approach_stats),
            rule_counts: self.rule_counts.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_decisions: u64,
    pub total_emitted: u64,
    pub total_deduplicated: u64,
    pub total_immediate: u64,
    pub dedup_rate: f64,
    pub danger_level: StatLine,
    pub approach_speed: StatLine,
    pub rule_counts: std::collections::HashMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Decision Metrics Summary ===")?;
        writeln!(f, "Total decisions: {}", self.total_decisions)?;
        writeln!(
            f,
            "Instructions emitted: {} ({} immediate)",
            self.total_emitted, self.total_immediate
        )?;
        writeln!(
            f,
            "Deduplicated: {} ({:.2}%)",
            self.total_deduplicated, self.dedup_rate
        )?;
        writeln!(f, "Danger level: {}", self.danger_level)?;
        writeln!(f, "Approach speed (m/s): {}", self.approach_speed)?;

        if !self.rule_counts.is_empty() {
            writeln!(f, "Rule hit counts:")?;
            let mut rules: Vec<_> = self.rule_counts.iter().collect();
            rules.sort_by(|a, b| b.1.cmp(a.1));
            for (rule, count) in rules {
                writeln!(f, "  {}: {}", rule, count)?;
            }
        }

        Ok(())
    }
}

/// 摘要中的单行统计
///
/// 从 `RunningStats` 固化出来的只读视图，空序列渲染为 N/A。
#[derive(Debug, Clone, Default)]
pub struct StatLine {
    pub samples: u64,
    pub mean: f64,
    pub std_dev: f64,
    pub low: f64,
    pub high: f64,
}

impl From<&RunningStats> for StatLine {
    fn from(stats: &RunningStats) -> Self {
        let (low, high) = stats.range().unwrap_or((0.0, 0.0));
        Self {
            samples: stats.len(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
            low,
            high,
        }
    }
}

impl std::fmt::Display for StatLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.samples == 0 {
            return write!(f, "N/A");
        }
        write!(
            f,
            "mean {:.3} ±{:.3}, range {:.3}..{:.3} (n={})",
            self.mean, self.std_dev, self.low, self.high, self.samples
        )
    }
}

/// 流式统计量
///
/// Welford 单遍递推，常数内存；一次行走会产生上万个 tick，
/// 不能把样本攒在内存里。极值用 `Option` 表达，空序列没有哨兵值。
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    sq_diff_sum: f64,
    range: Option<(f64, f64)>,
}

impl RunningStats {
    /// 吸收一个观测值
    pub fn observe(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.sq_diff_sum += delta * (value - self.mean);

        self.range = Some(match self.range {
            None => (value, value),
            Some((low, high)) => (low.min(value), high.max(value)),
        });
    }

    /// 观测值数量
    pub fn len(&self) -> u64 {
        self.count
    }

    /// 尚无观测值
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// 均值（空序列为 0）
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// 样本方差（n-1；不足两个观测值时为 0）
    pub fn sample_variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        self.sq_diff_sum / (self.count - 1) as f64
    }

    /// 样本标准差
    pub fn std_dev(&self) -> f64 {
        self.sample_variance().sqrt()
    }

    /// 观测到的最小值与最大值
    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }
}
