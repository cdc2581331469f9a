//! Replay cane implementation
//!
//! Implements `PacketSource`, replays a JSONL recording of cane packets.
//! Malformed lines are skipped and counted, the stream keeps going.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use contracts::{PacketCallback, PacketSource};
use tracing::{debug, warn};

use crate::frame;
use crate::mock::epoch_ms;

/// Replay configuration
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Recording path (one JSON packet per line)
    pub path: PathBuf,
    /// Speed multiplier (1.0 = recorded pacing)
    pub speed_multiplier: f64,
    /// Restart from the top when the file ends
    pub loop_playback: bool,
    /// Rewrite packet timestamps to the current clock
    ///
    /// Recordings are hours or days old; without rebasing every packet
    /// would fail the staleness gate.
    pub rebase_timestamps: bool,
}

impl ReplayConfig {
    /// Replay the given file at recorded pacing
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            speed_multiplier: 1.0,
            loop_playback: false,
            rebase_timestamps: true,
        }
    }
}

/// Replay cane
///
/// Reads the recording line by line on a background thread and delivers
/// packets through the callback, pacing itself by the recorded timestamp
/// deltas divided by the speed multiplier.
pub struct ReplayCane {
    source_name: String,
    config: ReplayConfig,
    listening: Arc<AtomicBool>,
    parse_errors: Arc<AtomicU64>,
}

impl ReplayCane {
    /// Create a new replay cane
    pub fn new(source_name: impl Into<String>, config: ReplayConfig) -> Self {
        Self {
            source_name: source_name.into(),
            config,
            listening: Arc::new(AtomicBool::new(false)),
            parse_errors: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Lines that failed to parse so far
    pub fn parse_errors(&self) -> u64 {
        self.parse_errors.load(Ordering::Relaxed)
    }

    fn play_file(
        path: &PathBuf,
        config: &ReplayConfig,
        listening: &Arc<AtomicBool>,
        parse_errors: &Arc<AtomicU64>,
        callback: &PacketCallback,
    ) -> std::io::Result<()> {
        let reader = BufReader::new(File::open(path)?);
        let mut last_recorded_ms: Option<u64> = None;

        for line in reader.lines() {
            if !listening.load(Ordering::Relaxed) {
                break;
            }

            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let mut packet = match frame::decode_line(&line) {
                Ok(packet) => packet,
                Err(e) => {
                    parse_errors.fetch_add(1, Ordering::Relaxed);
                    warn!(error = %e, "skipping malformed replay line");
                    continue;
                }
            };

            // Pace by recorded deltas, capped so corrupt timestamps can't stall playback
            if let Some(last) = last_recorded_ms {
                let delta = packet.timestamp_ms.saturating_sub(last).min(2000);
                if delta > 0 && config.speed_multiplier > 0.0 {
                    let wait = delta as f64 / config.speed_multiplier;
                    thread::sleep(Duration::from_millis(wait as u64));
                }
            }
            last_recorded_ms = Some(packet.timestamp_ms);

            if config.rebase_timestamps {
                packet.timestamp_ms = epoch_ms();
            }

            callback(packet);
        }

        Ok(())
    }
}

impl PacketSource for ReplayCane {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn listen(&self, callback: PacketCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let source_name = self.source_name.clone();
        let config = self.config.clone();
        let listening = self.listening.clone();
        let parse_errors = self.parse_errors.clone();

        thread::spawn(move || {
            debug!(
                source = %source_name,
                path = %config.path.display(),
                speed = config.speed_multiplier,
                "replay started"
            );

            loop {
                if let Err(e) = ReplayCane::play_file(
                    &config.path,
                    &config,
                    &listening,
                    &parse_errors,
                    &callback,
                ) {
                    warn!(source = %source_name, error = %e, "replay read failed");
                    break;
                }

                if !config.loop_playback || !listening.load(Ordering::Relaxed) {
                    break;
                }
                debug!(source = %source_name, "replay looping");
            }

            listening.store(false, Ordering::SeqCst);
            debug!(source = %source_name, "replay finished");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
