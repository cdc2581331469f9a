//! Guidance executor state machine.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use contracts::{
    CoreError, DecisionSnapshot, ExecutorConfig, FollowUpAction, Instruction, SpeechPriority,
    SpeechSynthesizer,
};
use tracing::{debug, warn};

use crate::displacement::DisplacementTracker;
use crate::metrics::ExecutorMetrics;

/// Executor lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    /// Nothing to say, nothing tracked
    Idle,
    /// An utterance is in flight
    Speaking,
    /// A displacement is being tracked toward a follow-up
    Navigating,
    /// A preempting utterance is in flight
    Alerting,
    /// Output suspended by the user
    Paused,
}

/// Queued utterance, ordered by priority then arrival
struct PendingUtterance {
    priority: SpeechPriority,
    seq: u64,
    instruction: Instruction,
    snapshot: DecisionSnapshot,
}

impl PartialEq for PendingUtterance {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for PendingUtterance {}

impl PartialOrd for PendingUtterance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingUtterance {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: higher priority first, then FIFO within a priority
        self.priority
            .cmp(&other.priority)
            .then(other.seq.cmp(&self.seq))
    }
}

/// Guidance executor
///
/// Serializes instructions into speech, tracks guided displacements and
/// announces follow-up actions. Owned by a single worker task; all methods
/// take `&mut self` and never run concurrently.
pub struct GuidanceExecutor<S: SpeechSynthesizer> {
    speech: S,
    config: ExecutorConfig,
    state: ExecutorState,
    pending: BinaryHeap<PendingUtterance>,
    seq: u64,
    tracker: Option<(DisplacementTracker, Option<FollowUpAction>)>,
    metrics: Arc<ExecutorMetrics>,
}

impl<S: SpeechSynthesizer> GuidanceExecutor<S> {
    /// Create an executor around a speech collaborator
    pub fn new(speech: S, config: ExecutorConfig) -> Self {
        Self {
            speech,
            config,
            state: ExecutorState::Idle,
            pending: BinaryHeap::new(),
            seq: 0,
            tracker: None,
            metrics: Arc::new(ExecutorMetrics::new()),
        }
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> Arc<ExecutorMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Current state
    pub fn state(&self) -> ExecutorState {
        self.state
    }

    /// Process one instruction emitted by the engine
    ///
    /// Immediate instructions preempt the current utterance and speak at
    /// urgent priority; others queue at normal priority and drain in
    /// order.
    pub async fn process(
        &mut self,
        instruction: Instruction,
        snapshot: &DecisionSnapshot,
        now_ms: u64,
    ) -> Result<(), CoreError> {
        if instruction.immediate {
            self.speech.interrupt().await?;
            self.metrics.inc_preempted();
            self.state = ExecutorState::Alerting;
            self.speak_now(instruction, snapshot, SpeechPriority::Urgent, now_ms)
                .await?;
            return Ok(());
        }

        self.seq += 1;
        self.pending.push(PendingUtterance {
            priority: SpeechPriority::Normal,
            seq: self.seq,
            instruction,
            snapshot: snapshot.clone(),
        });
        self.metrics.set_queue_len(self.pending.len());

        if self.state != ExecutorState::Paused {
            self.drain_pending(now_ms).await?;
        }
        Ok(())
    }

    /// Advance the displacement tracker by one timer tick
    ///
    /// Fires the follow-up utterance when the target distance is covered
    /// and logs a non-fatal timeout when no update arrived for too long.
    pub async fn tick(
        &mut self,
        now_ms: u64,
        current: Option<&DecisionSnapshot>,
    ) -> Result<(), CoreError> {
        if self.state == ExecutorState::Paused {
            return Ok(());
        }

        let mut completed: Option<Option<FollowUpAction>> = None;
        if let Some((tracker, follow_up)) = &mut self.tracker {
            if let Some(snapshot) = current {
                tracker.update(now_ms, snapshot, &self.config);
            }

            if tracker.check_stuck(now_ms, &self.config) {
                warn!(
                    tracked_m = tracker.tracked_m(),
                    target_m = tracker.target_m(),
                    "displacement tracker stuck, no updates"
                );
                self.metrics.inc_stuck();
            }

            if tracker.is_complete() {
                debug!(tracked_m = tracker.tracked_m(), "displacement complete");
                completed = Some(follow_up.take());
            }
        }

        if let Some(follow_up) = completed {
            self.tracker = None;
            self.state = ExecutorState::Idle;

            if let Some(action) = follow_up {
                if let Err(e) = self
                    .speech
                    .speak(action_phrase(&action), SpeechPriority::Normal)
                    .await
                {
                    self.metrics.inc_speech_failure();
                    return Err(e);
                }
                self.metrics.inc_follow_up();
                self.metrics.inc_spoken();
            }
        }

        self.drain_pending(now_ms).await
    }

    /// Fold an externally measured distance into the active tracker
    pub fn apply_external_distance(&mut self, distance_m: f64, now_ms: u64) {
        if let Some((tracker, _)) = &mut self.tracker {
            tracker.apply_external_distance(distance_m, now_ms);
        }
    }

    /// Suspend output
    pub async fn pause(&mut self) -> Result<(), CoreError> {
        self.speech.pause().await?;
        self.state = ExecutorState::Paused;
        Ok(())
    }

    /// Resume output and drain anything queued meanwhile
    pub async fn resume(&mut self, now_ms: u64) -> Result<(), CoreError> {
        self.speech.resume().await?;
        self.settle_state();
        self.drain_pending(now_ms).await
    }

    /// Stop speech and drop everything pending
    pub async fn dispose(&mut self) -> Result<(), CoreError> {
        self.pending.clear();
        self.tracker = None;
        self.state = ExecutorState::Idle;
        self.speech.stop().await
    }

    async fn drain_pending(&mut self, now_ms: u64) -> Result<(), CoreError> {
        while let Some(pending) = self.pending.pop() {
            self.metrics.set_queue_len(self.pending.len());
            self.state = ExecutorState::Speaking;
            let snapshot = pending.snapshot.clone();
            self.speak_now(pending.instruction, &snapshot, pending.priority, now_ms)
                .await?;
        }
        Ok(())
    }

    async fn speak_now(
        &mut self,
        instruction: Instruction,
        snapshot: &DecisionSnapshot,
        priority: SpeechPriority,
        now_ms: u64,
    ) -> Result<(), CoreError> {
        let result = self.speech.speak(&instruction.message, priority).await;
        if let Err(e) = result {
            self.metrics.inc_speech_failure();
            self.settle_state();
            return Err(e);
        }
        self.metrics.inc_spoken();

        if let Some(target) = instruction.distance_m.filter(|d| *d > 0.0) {
            self.tracker = Some((
                DisplacementTracker::start(target, snapshot, now_ms),
                instruction.follow_up.clone(),
            ));
        }
        self.settle_state();
        Ok(())
    }

    fn settle_state(&mut self) {
        self.state = if self.tracker.is_some() {
            ExecutorState::Navigating
        } else {
            ExecutorState::Idle
        };
    }
}

/// Fixed utterance for a follow-up action
fn action_phrase(action: &FollowUpAction) -> &str {
    match action {
        FollowUpAction::TurnLeft => "turn left now",
        FollowUpAction::TurnRight => "turn right now",
        FollowUpAction::Stop => "stop",
        FollowUpAction::Continue => "continue straight",
        FollowUpAction::Raw(text) => text,
    }
}
