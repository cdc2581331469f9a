//! Water hazard rule.

use contracts::{DecisionSnapshot, Instruction};

use crate::rule::GuidanceRule;

/// Standing water ahead of the cane tip
pub struct Water;

impl GuidanceRule for Water {
    fn name(&self) -> &'static str {
        "water"
    }

    fn priority(&self) -> i32 {
        90
    }

    fn matches(&self, snapshot: &DecisionSnapshot) -> bool {
        snapshot.water_detected
    }

    fn apply(&mut self, _snapshot: &DecisionSnapshot) -> Instruction {
        Instruction::warning("attention, water on the ground, advance slowly")
    }
}
