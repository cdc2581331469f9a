//! GuidanceHandle - manages the executor with an isolated queue and worker task.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{DecisionSnapshot, ExecutorConfig, Instruction, SpeechSynthesizer};

use crate::executor::GuidanceExecutor;
use crate::metrics::ExecutorMetrics;
use crate::epoch_ms;

/// Handle to a running guidance worker
///
/// The worker owns the executor and its speech collaborator; the pipeline
/// talks to it through a bounded channel and never blocks on speech.
pub struct GuidanceHandle {
    /// Channel to send (instruction, snapshot) pairs to the worker
    tx: mpsc::Sender<(Instruction, DecisionSnapshot)>,
    /// Shared metrics
    metrics: Arc<ExecutorMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl GuidanceHandle {
    /// Spawn the worker task around a speech collaborator
    pub fn spawn<S: SpeechSynthesizer + Send + 'static>(
        speech: S,
        config: ExecutorConfig,
        queue_capacity: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel(queue_capacity);
        let executor = GuidanceExecutor::new(speech, config.clone());
        let metrics = executor.metrics();

        let worker_handle = tokio::spawn(async move {
            guidance_worker(executor, rx, config).await;
        });

        Self {
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<ExecutorMetrics> {
        &self.metrics
    }

    /// Send an instruction to the worker (non-blocking)
    ///
    /// Returns true if sent, false if the queue is full (instruction
    /// dropped and counted)
    pub fn try_send(&self, instruction: Instruction, snapshot: DecisionSnapshot) -> bool {
        match self.tx.try_send((instruction, snapshot)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.inc_dropped();
                warn!("guidance queue full, instruction dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!("guidance worker closed unexpectedly");
                false
            }
        }
    }

    /// Shutdown the worker gracefully
    #[instrument(name = "guidance_handle_shutdown", skip(self))]
    pub async fn shutdown(self) {
        // Drop sender to signal the worker to stop
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(error = ?e, "guidance worker panicked");
        }
        debug!("guidance handle shutdown complete");
    }
}

/// Worker task: consumes instructions and drives the displacement timer
async fn guidance_worker<S: SpeechSynthesizer>(
    mut executor: GuidanceExecutor<S>,
    mut rx: mpsc::Receiver<(Instruction, DecisionSnapshot)>,
    config: ExecutorConfig,
) {
    debug!("guidance worker started");

    let mut interval = tokio::time::interval(std::time::Duration::from_millis(config.tick_ms));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut latest_snapshot: Option<DecisionSnapshot> = None;

    loop {
        tokio::select! {
            received = rx.recv() => {
                match received {
                    Some((instruction, snapshot)) => {
                        latest_snapshot = Some(snapshot.clone());
                        if let Err(e) = executor.process(instruction, &snapshot, epoch_ms()).await {
                            // Keep running on a single failed utterance
                            error!(error = %e, "instruction processing failed");
                        }
                    }
                    None => break,
                }
            }
            _ = interval.tick() => {
                if let Err(e) = executor.tick(epoch_ms(), latest_snapshot.as_ref()).await {
                    error!(error = %e, "displacement tick failed");
                }
            }
        }
    }

    if let Err(e) = executor.dispose().await {
        error!(error = %e, "speech stop failed on shutdown");
    }

    debug!("guidance worker stopped");
}
