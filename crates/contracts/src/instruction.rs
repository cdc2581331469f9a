//! Instruction - Expert engine output
//!
//! A single voice-guidance directive with optional displacement target
//! and follow-up action.

use serde::{Deserialize, Serialize};

/// Average step length used to convert distances to step counts (meters)
pub const STEP_LENGTH_M: f64 = 0.5;
/// Nominal speech rate used for duration estimates (words per minute)
pub const SPEECH_WORDS_PER_MINUTE: f64 = 150.0;

/// Instruction category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionKind {
    /// Danger notification, no displacement expected
    Warning,
    /// Movement guidance
    Guidance,
    /// Trajectory correction
    Correction,
}

/// Action announced after a guided displacement completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpAction {
    TurnLeft,
    TurnRight,
    Stop,
    Continue,
    /// Literal utterance
    Raw(String),
}

/// Voice guidance instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Category
    pub kind: InstructionKind,

    /// Spoken message (opaque UTF-8, language of the synthesizer)
    pub message: String,

    /// Displacement target before the follow-up fires (meters)
    pub distance_m: Option<f64>,

    /// Step estimate derived from `distance_m`
    pub steps: Option<u32>,

    /// Action announced once the displacement target is reached
    pub follow_up: Option<FollowUpAction>,

    /// Preempts the current utterance when true
    pub immediate: bool,
}

impl Instruction {
    fn new(kind: InstructionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            distance_m: None,
            steps: None,
            follow_up: None,
            immediate: false,
        }
    }

    /// Build a warning
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(InstructionKind::Warning, message)
    }

    /// Build a guidance
    pub fn guidance(message: impl Into<String>) -> Self {
        Self::new(InstructionKind::Guidance, message)
    }

    /// Build a correction
    pub fn correction(message: impl Into<String>) -> Self {
        Self::new(InstructionKind::Correction, message)
    }

    /// Attach a displacement target; fills the step estimate
    pub fn with_distance(mut self, distance_m: f64) -> Self {
        self.steps = Some((distance_m / STEP_LENGTH_M).round() as u32);
        self.distance_m = Some(distance_m);
        self
    }

    /// Attach a follow-up action
    pub fn with_follow_up(mut self, action: FollowUpAction) -> Self {
        self.follow_up = Some(action);
        self
    }

    /// Mark as immediate (preempting)
    pub fn immediate(mut self) -> Self {
        self.immediate = true;
        self
    }

    /// The instruction expects the user to cover a distance
    pub fn requires_movement(&self) -> bool {
        self.distance_m.map_or(false, |d| d > 0.0)
    }

    /// Rough utterance duration at the nominal speech rate
    pub fn estimated_speech_duration_ms(&self) -> u64 {
        let words = self.message.split_whitespace().count() as f64;
        (words / SPEECH_WORDS_PER_MINUTE * 60_000.0).round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_estimate() {
        let instruction = Instruction::guidance("advance slowly").with_distance(1.0);
        assert_eq!(instruction.steps, Some(2));
        assert!(instruction.requires_movement());

        let short = Instruction::guidance("advance slowly").with_distance(0.6);
        assert_eq!(short.steps, Some(1));
    }

    #[test]
    fn test_no_movement_without_distance() {
        let instruction = Instruction::warning("attention, stop");
        assert!(!instruction.requires_movement());
        assert_eq!(instruction.steps, None);
    }

    #[test]
    fn test_speech_duration_estimate() {
        // 5 words at 150 wpm = 2 seconds
        let instruction = Instruction::guidance("turn left now then continue");
        assert_eq!(instruction.estimated_speech_duration_ms(), 2000);
    }

    #[test]
    fn test_builder_chain() {
        let instruction = Instruction::correction("return one meter back")
            .with_distance(1.0)
            .with_follow_up(FollowUpAction::TurnRight)
            .immediate();

        assert_eq!(instruction.kind, InstructionKind::Correction);
        assert_eq!(instruction.follow_up, Some(FollowUpAction::TurnRight));
        assert!(instruction.immediate);
    }
}
