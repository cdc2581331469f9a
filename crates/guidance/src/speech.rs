//! TracingSpeech - logs utterances via tracing.
//!
//! Stands in for the platform synthesizer during development and tests.
//! Optionally simulates utterance timing at the assistive speaking rate
//! (about half the conversational rate).

use std::time::Duration;

use contracts::{CoreError, SpeechPriority, SpeechSynthesizer, SPEECH_WORDS_PER_MINUTE};
use tracing::{debug, info};

/// Speaking rate relative to the nominal conversational rate
const ASSISTIVE_RATE: f64 = 0.5;

/// Synthesizer that logs utterances for debugging
pub struct TracingSpeech {
    name: String,
    simulate_timing: bool,
}

impl TracingSpeech {
    /// Create a new TracingSpeech with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            simulate_timing: false,
        }
    }

    /// Sleep for the estimated utterance duration on every `speak`
    pub fn with_simulated_timing(mut self) -> Self {
        self.simulate_timing = true;
        self
    }

    fn utterance_duration(text: &str) -> Duration {
        let words = text.split_whitespace().count() as f64;
        let nominal_ms = words / SPEECH_WORDS_PER_MINUTE * 60_000.0;
        Duration::from_millis((nominal_ms / ASSISTIVE_RATE) as u64)
    }
}

impl SpeechSynthesizer for TracingSpeech {
    fn name(&self) -> &str {
        &self.name
    }

    async fn speak(&mut self, text: &str, priority: SpeechPriority) -> Result<(), CoreError> {
        info!(
            synthesizer = %self.name,
            priority = ?priority,
            "speaking: {text}"
        );

        if self.simulate_timing {
            tokio::time::sleep(Self::utterance_duration(text)).await;
        }
        Ok(())
    }

    async fn interrupt(&mut self) -> Result<(), CoreError> {
        debug!(synthesizer = %self.name, "utterance interrupted");
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), CoreError> {
        debug!(synthesizer = %self.name, "paused");
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), CoreError> {
        debug!(synthesizer = %self.name, "resumed");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), CoreError> {
        debug!(synthesizer = %self.name, "stopped");
        Ok(())
    }

    async fn wait_for_completion(&mut self) -> Result<(), CoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_speak_logs_and_returns() {
        let mut speech = TracingSpeech::new("test_voice");
        assert_eq!(speech.name(), "test_voice");
        assert!(speech.speak("continue straight", SpeechPriority::Normal).await.is_ok());
    }

    #[test]
    fn test_duration_uses_assistive_rate() {
        // 5 words: 2 s nominal, 4 s at half rate
        let duration = TracingSpeech::utterance_duration("turn left now then continue");
        assert_eq!(duration, Duration::from_secs(4));
    }
}
