//! Fixed-capacity sample windows backing the streaming filter.

use std::collections::VecDeque;

/// Plain scalar sliding window
///
/// Holds up to `capacity` samples, evicting the oldest on overflow.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl SampleWindow {
    /// Create a window with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a sample, dropping the oldest once full
    pub fn push(&mut self, value: f64) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Arithmetic mean over the current window
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    /// Number of stored samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// No samples stored
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Window is at capacity
    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    /// Drop all samples
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Obstacle distance window with null handling and anomaly rejection
///
/// Null samples occupy a slot but contribute nothing to the mean. A sample
/// that jumps more than the gate away from the most recent non-null sample
/// is rejected outright; such jumps are physically impossible at walking
/// speed and are ultrasonic glitches.
#[derive(Debug, Clone)]
pub struct ObstacleChannel {
    samples: VecDeque<Option<f64>>,
    capacity: usize,
    gate_m: f64,
    last_valid_mean: Option<f64>,
}

impl ObstacleChannel {
    /// Create a channel with the given capacity and anomaly gate
    pub fn new(capacity: usize, gate_m: f64) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            gate_m,
            last_valid_mean: None,
        }
    }

    /// Push a sample and return the filtered output for this tick
    ///
    /// - `None` input: stored as-is, output is `None` (the disappearance
    ///   must reach the temporal state unchanged)
    /// - warm-up (< 2 non-null samples): raw value passes through
    /// - anomalous input: not stored, last valid mean is returned
    pub fn push(&mut self, sample: Option<f64>) -> Option<f64> {
        match sample {
            None => {
                self.store(None);
                None
            }
            Some(value) => {
                if let Some(recent) = self.most_recent_valid() {
                    if (value - recent).abs() > self.gate_m {
                        return self.last_valid_mean.or(Some(recent));
                    }
                }

                let warming_up = self.valid_count() < 2;
                self.store(Some(value));

                let output = if warming_up {
                    value
                } else {
                    // At least the value just stored is present
                    self.valid_mean().unwrap_or(value)
                };
                self.last_valid_mean = Some(output);
                Some(output)
            }
        }
    }

    /// Number of stored slots (null or not)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// No slots stored
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Channel is at capacity
    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    /// Drop all samples and the cached mean
    pub fn clear(&mut self) {
        self.samples.clear();
        self.last_valid_mean = None;
    }

    fn store(&mut self, sample: Option<f64>) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    fn most_recent_valid(&self) -> Option<f64> {
        self.samples.iter().rev().find_map(|s| *s)
    }

    fn valid_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_some()).count()
    }

    fn valid_mean(&self) -> Option<f64> {
        let values: Vec<f64> = self.samples.iter().filter_map(|s| *s).collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
