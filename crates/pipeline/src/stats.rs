//! Pipeline statistics.

use std::time::Duration;

use observability::DecisionMetricsAggregator;

use crate::processor::ProcessorCounters;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Packet counters from the processing core
    pub counters: ProcessorCounters,

    /// Instructions handed to the guidance executor
    pub instructions_emitted: u64,

    /// Instructions suppressed by deduplication
    pub deduplicated: u64,

    /// Instructions suppressed while degraded
    pub suppressed_degraded: u64,

    /// Navigation events observed
    pub route_events: u64,

    /// Filter had a full window at shutdown
    pub filter_warmed_up: bool,

    /// Navigator progress at shutdown, when a route was active
    pub navigator_progress: Option<f64>,

    /// The pipeline ended in degraded mode (collaborator failure)
    pub degraded: bool,

    /// Total duration of the run
    pub duration: Duration,

    /// Decision metrics aggregator
    pub decision_metrics: DecisionMetricsAggregator,
}

impl PipelineStats {
    /// Packets per second throughput
    pub fn packets_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.counters.processed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Validation error rate as percentage
    pub fn error_rate(&self) -> f64 {
        if self.counters.received > 0 {
            self.counters.errored as f64 / self.counters.received as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n==================== Pipeline Statistics ====================");
        println!("Duration:              {:.2}s", self.duration.as_secs_f64());
        println!("Packets received:      {}", self.counters.received);
        println!("Packets processed:     {}", self.counters.processed);
        println!(
            "Packets errored:       {} ({:.2}%)",
            self.counters.errored,
            self.error_rate()
        );
        println!("Throughput:            {:.2} packets/s", self.packets_per_second());
        println!("Decisions skipped:     {}", self.counters.decisions_skipped);
        println!("Instructions emitted:  {}", self.instructions_emitted);
        println!("Deduplicated:          {}", self.deduplicated);
        println!("Route events:          {}", self.route_events);
        println!("GPS loss events:       {}", self.counters.gps_loss_events);
        println!("Filter warmed up:      {}", self.filter_warmed_up);
        if let Some(progress) = self.navigator_progress {
            println!("Route progress:        {:.0}%", progress * 100.0);
        }
        if self.degraded {
            println!("NOTE: pipeline ended in degraded mode");
        }

        println!("\n{}", self.decision_metrics.summary());
    }
}
