//! SpeechSynthesizer trait - Guidance executor output interface
//!
//! Defines the abstract interface for the speech collaborator.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Utterance priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechPriority {
    Urgent,
    Normal,
    Info,
}

impl SpeechPriority {
    /// Numeric rank, higher speaks first
    pub fn rank(&self) -> u8 {
        match self {
            Self::Urgent => 2,
            Self::Normal => 1,
            Self::Info => 0,
        }
    }
}

impl PartialOrd for SpeechPriority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SpeechPriority {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

/// Speech output trait
///
/// All synthesizer implementations must implement this trait. The rate is
/// expected to be around half the conversational rate; the message payload
/// is opaque UTF-8 in whatever language the synthesizer is configured for.
#[trait_variant::make(SpeechSynthesizer: Send)]
pub trait LocalSpeechSynthesizer {
    /// Synthesizer name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Speak a message; resolves when the utterance completes
    ///
    /// # Errors
    /// Returns a speech error (should include context)
    async fn speak(&mut self, text: &str, priority: SpeechPriority) -> Result<(), CoreError>;

    /// Cut off the current utterance
    async fn interrupt(&mut self) -> Result<(), CoreError>;

    /// Pause output
    async fn pause(&mut self) -> Result<(), CoreError>;

    /// Resume output
    async fn resume(&mut self) -> Result<(), CoreError>;

    /// Stop and discard anything pending
    async fn stop(&mut self) -> Result<(), CoreError>;

    /// Wait until the current utterance (if any) finishes
    async fn wait_for_completion(&mut self) -> Result<(), CoreError>;
}
