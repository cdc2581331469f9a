//! Fallback rule.

use contracts::{DecisionSnapshot, FollowUpAction, Instruction};

use crate::rule::GuidanceRule;

/// Always matches; guarantees the engine is total
pub struct ClearPath;

impl GuidanceRule for ClearPath {
    fn name(&self) -> &'static str {
        "clear_path"
    }

    fn priority(&self) -> i32 {
        0
    }

    fn matches(&self, _snapshot: &DecisionSnapshot) -> bool {
        true
    }

    fn apply(&mut self, _snapshot: &DecisionSnapshot) -> Instruction {
        Instruction::guidance("path clear, continue straight")
            .with_follow_up(FollowUpAction::Continue)
    }
}
