//! Executor metrics for observability.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for a guidance executor
#[derive(Debug, Default)]
pub struct ExecutorMetrics {
    /// Current pending-queue length
    queue_len: AtomicUsize,
    /// Utterances spoken to completion
    spoken_count: AtomicU64,
    /// Utterances that preempted the current one
    preempted_count: AtomicU64,
    /// Instructions dropped on a full input queue
    dropped_count: AtomicU64,
    /// Follow-up actions announced after a displacement
    follow_up_count: AtomicU64,
    /// Stuck-tracker timeouts observed
    stuck_count: AtomicU64,
    /// Speech collaborator failures
    speech_failures: AtomicU64,
}

impl ExecutorMetrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn inc_spoken(&self) {
        self.spoken_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_preempted(&self) {
        self.preempted_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_dropped(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_follow_up(&self) {
        self.follow_up_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_stuck(&self) {
        self.stuck_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_speech_failure(&self) {
        self.speech_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn spoken_count(&self) -> u64 {
        self.spoken_count.load(Ordering::Relaxed)
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    pub fn speech_failures(&self) -> u64 {
        self.speech_failures.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> ExecutorMetricsSnapshot {
        ExecutorMetricsSnapshot {
            queue_len: self.queue_len.load(Ordering::Relaxed),
            spoken_count: self.spoken_count.load(Ordering::Relaxed),
            preempted_count: self.preempted_count.load(Ordering::Relaxed),
            dropped_count: self.dropped_count.load(Ordering::Relaxed),
            follow_up_count: self.follow_up_count.load(Ordering::Relaxed),
            stuck_count: self.stuck_count.load(Ordering::Relaxed),
            speech_failures: self.speech_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of executor metrics (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutorMetricsSnapshot {
    pub queue_len: usize,
    pub spoken_count: u64,
    pub preempted_count: u64,
    pub dropped_count: u64,
    pub follow_up_count: u64,
    pub stuck_count: u64,
    pub speech_failures: u64,
}
