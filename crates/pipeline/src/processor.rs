//! Synchronous per-packet processing core.
//!
//! Everything that happens to a single packet before the guidance handoff
//! lives here, free of channels and timers, so the whole decision path is
//! unit-testable.

use contracts::{
    CanePacket, CoreError, DecisionSnapshot, GpsContext, PipelineConfig,
};
use navigation::geo::normalize_bearing_deg;
use navigation::{RouteEvent, RouteNavigator};
use perception::{build_snapshot, StreamingFilter, TemporalState};
use tracing::{debug, instrument, warn};

/// Output of one processing tick
#[derive(Debug)]
pub struct TickOutput {
    /// Derived temporal state (also broadcast to observers)
    pub state: TemporalState,

    /// Navigation event raised by this packet's fix, if any
    pub route_event: Option<RouteEvent>,

    /// Decision input; `None` when the snapshot gate rejected the tick
    pub snapshot: Option<DecisionSnapshot>,
}

/// Processing counters
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessorCounters {
    /// Packets handed to the processor
    pub received: u64,
    /// Packets that passed validation and produced a state
    pub processed: u64,
    /// Packets rejected by validation
    pub errored: u64,
    /// Ticks whose decision was skipped by the snapshot gate
    pub decisions_skipped: u64,
    /// Transitions into GPS-lost
    pub gps_loss_events: u64,
}

/// Per-packet processing core
///
/// Owns the filter, the previous temporal state, the optional route
/// navigator and the GPS-loss bookkeeping. Mutated only from the pipeline
/// task.
pub struct PacketProcessor {
    config: PipelineConfig,
    filter: StreamingFilter,
    navigator: Option<RouteNavigator>,
    last_state: Option<TemporalState>,
    invalid_fix_streak: u32,
    gps_lost: bool,
    counters: ProcessorCounters,
}

impl PacketProcessor {
    /// Create a processor; the navigator is optional (no active route)
    pub fn new(config: PipelineConfig, navigator: Option<RouteNavigator>) -> Self {
        let filter = StreamingFilter::new(&config.filter);
        Self {
            config,
            filter,
            navigator,
            last_state: None,
            invalid_fix_streak: 0,
            gps_lost: false,
            counters: ProcessorCounters::default(),
        }
    }

    /// Process one packet through validate → filter → state → navigate →
    /// snapshot
    #[instrument(name = "processor_tick", level = "debug", skip(self, packet))]
    pub fn process(&mut self, packet: CanePacket, now_ms: u64) -> Result<TickOutput, CoreError> {
        self.counters.received += 1;

        if let Err(e) = self.validate(&packet, now_ms) {
            self.counters.errored += 1;
            return Err(e);
        }

        let filtered = self.filter.filter(packet);
        let state = TemporalState::from_packet(filtered, self.last_state.as_ref(), now_ms);
        self.counters.processed += 1;

        let route_event = self.update_navigation(&state);
        let snapshot = self.try_snapshot(&state, now_ms);

        self.last_state = Some(state.clone());

        Ok(TickOutput {
            state,
            route_event,
            snapshot,
        })
    }

    /// The GPS-lost flag driven by consecutive invalid fixes
    pub fn gps_lost(&self) -> bool {
        self.gps_lost
    }

    /// Counter snapshot
    pub fn counters(&self) -> ProcessorCounters {
        self.counters
    }

    /// Filter warm-up state
    pub fn filter_warmed_up(&self) -> bool {
        self.filter.is_warmed_up()
    }

    /// Navigator progress, when a route is active
    pub fn navigator_progress(&self) -> Option<f64> {
        self.navigator
            .as_ref()
            .filter(|n| n.has_active_destination())
            .map(|n| n.progress())
    }

    /// Access the navigator (route loading at runtime)
    pub fn navigator_mut(&mut self) -> Option<&mut RouteNavigator> {
        self.navigator.as_mut()
    }

    /// Reset filter windows, previous state and GPS-loss bookkeeping
    ///
    /// Counters survive a reset; they describe the pipeline lifetime.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.last_state = None;
        self.invalid_fix_streak = 0;
        self.gps_lost = false;
    }

    fn validate(&self, packet: &CanePacket, now_ms: u64) -> Result<(), CoreError> {
        let max_age_ms = self.config.freshness.max_age_ms;
        if packet.age_ms(now_ms) > max_age_ms {
            return Err(CoreError::StalePacket {
                age_ms: packet.age_ms(now_ms),
                max_age_ms,
            });
        }
        packet.validate(now_ms)
    }

    /// Forward the fix to the navigator and maintain the GPS-loss flag
    fn update_navigation(&mut self, state: &TemporalState) -> Option<RouteEvent> {
        let fix = state.packet.gps;

        if fix.is_valid() {
            self.invalid_fix_streak = 0;
            if self.gps_lost {
                debug!("gps signal recovered");
                self.gps_lost = false;
            }
        } else if self
            .navigator
            .as_ref()
            .map_or(false, |n| n.has_active_destination())
        {
            self.invalid_fix_streak += 1;
            if !self.gps_lost
                && self.invalid_fix_streak >= self.config.gps_loss.invalid_fix_threshold
            {
                warn!(
                    streak = self.invalid_fix_streak,
                    "gps signal lost during navigation"
                );
                self.gps_lost = true;
                self.counters.gps_loss_events += 1;
                observability::record_gps_loss();
            }
        }

        self.navigator.as_mut()?.update_position(&fix)
    }

    /// Run the snapshot gate; a rejected tick only skips the decision
    fn try_snapshot(&mut self, state: &TemporalState, now_ms: u64) -> Option<DecisionSnapshot> {
        let gps_context = self.gps_context(state);

        match build_snapshot(state, gps_context, self.config.snapshot_mode, now_ms) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                self.counters.decisions_skipped += 1;
                debug!(error = %e, "decision skipped for this tick");
                None
            }
        }
    }

    /// Navigation context for the snapshot: GPS heading when available,
    /// IMU yaw otherwise
    fn gps_context(&self, state: &TemporalState) -> GpsContext {
        let Some(navigator) = self.navigator.as_ref() else {
            return GpsContext::default();
        };

        let heading = state
            .packet
            .gps
            .heading
            .unwrap_or_else(|| normalize_bearing_deg(state.packet.imu.yaw));

        navigator.context(Some(heading), self.gps_lost)
    }
}
