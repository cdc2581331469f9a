//! Async pipeline runner.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_channel::Receiver;
use contracts::{CanePacket, DecisionSnapshot, Instruction, PipelineConfig};
use expert::ExpertEngine;
use guidance::GuidanceHandle;
use navigation::{RouteEvent, RouteNavigator};
use perception::TemporalState;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::epoch_ms;
use crate::processor::PacketProcessor;
use crate::stats::PipelineStats;

/// Run options
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Stop after this many processed packets (None = until source closes)
    pub max_packets: Option<u64>,
}

/// Cooperative stop handle
///
/// Stopping takes effect at packet granularity; the packet in flight
/// finishes its tick first.
#[derive(Debug, Clone)]
pub struct PipelineStopHandle {
    flag: Arc<AtomicBool>,
}

impl PipelineStopHandle {
    /// Request the pipeline to stop
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Has a stop been requested?
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Decision pipeline
///
/// Single-task orchestrator: consumes packets strictly in order, runs the
/// synchronous decision path and hands instructions to the guidance
/// worker. Observers receive every derived state on a broadcast channel.
pub struct GuidancePipeline {
    processor: PacketProcessor,
    engine: ExpertEngine,
    state_tx: broadcast::Sender<TemporalState>,
    stop: Arc<AtomicBool>,
    degraded: bool,
}

impl GuidancePipeline {
    /// Create a pipeline; the navigator is optional
    pub fn new(config: PipelineConfig, navigator: Option<RouteNavigator>) -> Self {
        let (state_tx, _) = broadcast::channel(config.channels.state_capacity);
        Self {
            processor: PacketProcessor::new(config, navigator),
            engine: ExpertEngine::with_default_rules(),
            state_tx,
            stop: Arc::new(AtomicBool::new(false)),
            degraded: false,
        }
    }

    /// Subscribe to the derived-state stream
    ///
    /// Observers receive states by value and must not assume they can keep
    /// up; the broadcast channel drops the oldest entries on lag.
    pub fn subscribe_states(&self) -> broadcast::Receiver<TemporalState> {
        self.state_tx.subscribe()
    }

    /// Get a stop handle usable from any task
    pub fn stop_handle(&self) -> PipelineStopHandle {
        PipelineStopHandle {
            flag: Arc::clone(&self.stop),
        }
    }

    /// Access the processor (route loading before or between runs)
    pub fn processor_mut(&mut self) -> &mut PacketProcessor {
        &mut self.processor
    }

    /// Reset filter, temporal chain and deduplication cache for a restart
    pub fn reset(&mut self) {
        self.processor.reset();
        self.engine.reset();
        self.stop.store(false, Ordering::SeqCst);
        self.degraded = false;
    }

    /// Run until the source closes, a stop is requested or the packet
    /// budget is hit; returns final statistics
    ///
    /// The guidance handle is consumed and shut down on exit (pending
    /// speech drains, at most one utterance).
    pub async fn run(
        mut self,
        packet_rx: Receiver<CanePacket>,
        guidance: GuidanceHandle,
        options: PipelineOptions,
    ) -> PipelineStats {
        let started = Instant::now();
        let mut stats = PipelineStats::default();

        info!(max_packets = ?options.max_packets, "pipeline running");

        let mut last_snapshot: Option<DecisionSnapshot> = None;
        let mut source_closed = true;

        while let Ok(packet) = packet_rx.recv().await {
            if self.stop.load(Ordering::SeqCst) {
                source_closed = false;
                break;
            }

            let now_ms = epoch_ms();
            observability::record_packet_received("cane");

            let tick = match self.processor.process(packet, now_ms) {
                Ok(tick) => tick,
                Err(e) => {
                    observability::record_packet_error(error_reason(&e));
                    debug!(error = %e, "packet dropped");
                    continue;
                }
            };

            // Observers are optional; send errors just mean nobody listens
            let _ = self.state_tx.send(tick.state.clone());
            observability::record_danger_level(tick.state.danger_level);

            if let Some(event) = &tick.route_event {
                stats.route_events += 1;
                self.announce_route_event(event);
            }

            if let Some(snapshot) = tick.snapshot {
                self.decide(&snapshot, &tick.state, &guidance, &mut stats);
                last_snapshot = Some(snapshot);
            }

            if let Some(max) = options.max_packets {
                if self.processor.counters().processed >= max {
                    info!(packets = max, "packet budget reached");
                    source_closed = false;
                    break;
                }
            }
        }

        // Data source gone while still wanted: the user must know
        if source_closed && !self.stop.load(Ordering::SeqCst) {
            warn!("packet source closed, data freshness lost");
            if let Some(snapshot) = &last_snapshot {
                guidance.try_send(
                    Instruction::warning("attention, connection to the cane lost, stop and wait")
                        .immediate(),
                    snapshot.clone(),
                );
            }
        }

        info!("pipeline draining guidance");
        let guidance_metrics = guidance.metrics().snapshot();
        guidance.shutdown().await;

        self.degraded = self.degraded || guidance_metrics.speech_failures > 0;

        stats.counters = self.processor.counters();
        stats.filter_warmed_up = self.processor.filter_warmed_up();
        stats.navigator_progress = self.processor.navigator_progress();
        stats.degraded = self.degraded;
        stats.duration = started.elapsed();

        info!(
            processed = stats.counters.processed,
            emitted = stats.instructions_emitted,
            duration_s = format!("{:.2}", stats.duration.as_secs_f64()),
            "pipeline shutdown complete"
        );

        stats
    }

    /// Evaluate one snapshot and forward the instruction
    fn decide(
        &mut self,
        snapshot: &DecisionSnapshot,
        state: &TemporalState,
        guidance: &GuidanceHandle,
        stats: &mut PipelineStats,
    ) {
        let evaluation = match self.engine.evaluate(snapshot) {
            Ok(evaluation) => evaluation,
            Err(e) => {
                // Unreachable with the fallback rule installed; never
                // surfaced to the user
                error!(error = %e, "rule evaluation failed");
                return;
            }
        };

        observability::record_decision(evaluation.rule_name, evaluation.instruction.as_ref());
        stats.decision_metrics.update(
            evaluation.rule_name,
            evaluation.instruction.as_ref(),
            state.danger_level,
            state.approach_speed,
        );

        let Some(mut instruction) = evaluation.instruction else {
            stats.deduplicated += 1;
            return;
        };

        // Escalate preemption when the temporal state demands it
        if state.requires_immediate_alert() {
            instruction.immediate = true;
        }

        if self.degraded {
            stats.suppressed_degraded += 1;
            return;
        }

        stats.instructions_emitted += 1;
        let priority = if instruction.immediate {
            contracts::SpeechPriority::Urgent
        } else {
            contracts::SpeechPriority::Normal
        };
        observability::record_instruction_spoken(priority, instruction.estimated_speech_duration_ms());
        guidance.try_send(instruction, snapshot.clone());

        // A failing speech collaborator downgrades the pipeline: keep
        // processing, stop emitting
        if guidance.metrics().speech_failures() > 0 && !self.degraded {
            warn!("speech collaborator failing, entering degraded mode");
            self.degraded = true;
        }
    }

    fn announce_route_event(&self, event: &RouteEvent) {
        match event {
            RouteEvent::WaypointReached { index, waypoint } => {
                info!(
                    index,
                    name = waypoint.name.as_deref().unwrap_or("unnamed"),
                    "waypoint reached"
                );
                observability::record_route_event("waypoint_reached");
            }
            RouteEvent::DestinationReached { name } => {
                info!(name = %name, "destination reached");
                observability::record_route_event("destination_reached");
            }
        }
    }
}

fn error_reason(error: &contracts::CoreError) -> &'static str {
    match error {
        contracts::CoreError::StalePacket { .. } => "stale",
        contracts::CoreError::InvalidPacket { .. } => "invalid",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ExecutorConfig, FixKind, GpsFix, ImuReading, ObstaclePair, WaterReading};
    use guidance::TracingSpeech;

    fn packet(timestamp_ms: u64, lower: Option<f64>) -> CanePacket {
        CanePacket {
            timestamp_ms,
            imu: ImuReading::new(0.0, -1.0, 0.5),
            obstacles: ObstaclePair::new(None, lower, 0.0),
            water: WaterReading::new(10.0, None),
            gps: GpsFix {
                latitude: Some(4.05),
                longitude: Some(9.76),
                satellites: Some(8),
                hdop: Some(1.0),
                fix_kind: FixKind::ThreeD,
                ..Default::default()
            },
        }
    }

    fn spawn_guidance() -> GuidanceHandle {
        GuidanceHandle::spawn(TracingSpeech::new("test"), ExecutorConfig::default(), 16)
    }

    #[tokio::test]
    async fn test_run_clear_walk_emits_once() {
        let pipeline = GuidancePipeline::new(PipelineConfig::default(), None);
        let (tx, rx) = async_channel::bounded(64);

        let now = epoch_ms();
        for i in 0..20 {
            tx.send(packet(now + i, Some(8.0))).await.unwrap();
        }
        drop(tx);

        let stats = pipeline.run(rx, spawn_guidance(), PipelineOptions::default()).await;

        assert_eq!(stats.counters.processed, 20);
        assert_eq!(stats.counters.errored, 0);
        // Clear path speaks once, the rest deduplicates
        assert_eq!(stats.instructions_emitted, 1);
        assert_eq!(stats.deduplicated, 19);
        assert!(stats.filter_warmed_up);
    }

    #[tokio::test]
    async fn test_run_rejects_expired_packets() {
        let pipeline = GuidancePipeline::new(PipelineConfig::default(), None);
        let (tx, rx) = async_channel::bounded(8);

        tx.send(packet(1000, Some(8.0))).await.unwrap();
        drop(tx);

        let stats = pipeline.run(rx, spawn_guidance(), PipelineOptions::default()).await;
        assert_eq!(stats.counters.errored, 1);
        assert_eq!(stats.counters.processed, 0);
    }

    #[tokio::test]
    async fn test_max_packets_budget() {
        let pipeline = GuidancePipeline::new(PipelineConfig::default(), None);
        let (tx, rx) = async_channel::bounded(64);

        let now = epoch_ms();
        for i in 0..50 {
            tx.send(packet(now + i, Some(8.0))).await.unwrap();
        }
        drop(tx);

        let stats = pipeline
            .run(
                rx,
                spawn_guidance(),
                PipelineOptions {
                    max_packets: Some(10),
                },
            )
            .await;
        assert_eq!(stats.counters.processed, 10);
    }

    #[tokio::test]
    async fn test_stop_handle_interrupts_run() {
        let pipeline = GuidancePipeline::new(PipelineConfig::default(), None);
        let stop = pipeline.stop_handle();
        let (tx, rx) = async_channel::bounded(8);

        let now = epoch_ms();
        tx.send(packet(now, Some(8.0))).await.unwrap();
        stop.stop();
        tx.send(packet(now + 1, Some(8.0))).await.unwrap();
        drop(tx);

        let stats = pipeline.run(rx, spawn_guidance(), PipelineOptions::default()).await;
        // The stop is observed before the first packet is processed
        assert_eq!(stats.counters.processed, 0);
        assert!(stop.is_stopped());
    }

    #[tokio::test]
    async fn test_state_broadcast_reaches_observers() {
        let pipeline = GuidancePipeline::new(PipelineConfig::default(), None);
        let mut states = pipeline.subscribe_states();
        let (tx, rx) = async_channel::bounded(8);

        let now = epoch_ms();
        tx.send(packet(now, Some(3.0))).await.unwrap();
        drop(tx);

        let run = tokio::spawn(pipeline.run(rx, spawn_guidance(), PipelineOptions::default()));

        let state = tokio::time::timeout(std::time::Duration::from_secs(2), states.recv())
            .await
            .expect("observer timed out")
            .expect("state received");
        assert_eq!(state.packet.obstacles.lower, Some(3.0));

        run.await.unwrap();
    }

    #[tokio::test]
    async fn test_obstacle_stream_emits_warnings() {
        let pipeline = GuidancePipeline::new(PipelineConfig::default(), None);
        let (tx, rx) = async_channel::bounded(64);

        let now = epoch_ms();
        // Walk toward a wall: distances shrink packet by packet
        for i in 0..30u64 {
            let lower = (6.0 - 0.2 * i as f64).max(0.4);
            tx.send(packet(now + i * 10, Some(lower))).await.unwrap();
        }
        drop(tx);

        let stats = pipeline.run(rx, spawn_guidance(), PipelineOptions::default()).await;

        // The closing wall must have triggered obstacle rules
        let hits = &stats.decision_metrics.rule_counts;
        assert!(
            hits.contains_key("medium_obstacle_front")
                || hits.contains_key("immediate_obstacle_front"),
            "no obstacle rule fired: {hits:?}"
        );
        assert!(stats.instructions_emitted >= 2);
    }
}
