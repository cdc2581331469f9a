//! Guidance rule trait and side-selection policy.

use contracts::{DecisionSnapshot, Instruction};

/// A priority-tagged predicate/action pair; first match wins
///
/// `matches` must be pure. Rules that keep a latch (one-shot announcements)
/// update it in `apply` and clear it in `refresh`, which the engine calls
/// on every rule before each evaluation.
pub trait GuidanceRule: Send {
    /// Stable rule name for logging and metrics
    fn name(&self) -> &'static str;

    /// Evaluation priority, higher wins
    fn priority(&self) -> i32;

    /// Does this rule fire for the snapshot?
    fn matches(&self, snapshot: &DecisionSnapshot) -> bool;

    /// Produce the instruction; may arm internal latches
    fn apply(&mut self, snapshot: &DecisionSnapshot) -> Instruction;

    /// Observe the snapshot regardless of matching; clears latches once
    /// the guarded condition is gone
    fn refresh(&mut self, _snapshot: &DecisionSnapshot) {}
}

/// Lateral direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Spoken form of the side
    pub fn spoken(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    /// The other side
    pub fn opposite(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Side the GPS correction points to, when a course deviation is known
///
/// Deviation is `heading - bearing`: a positive deviation means the walker
/// drifted clockwise past the target bearing and must turn left.
pub fn gps_correction_side(snapshot: &DecisionSnapshot) -> Option<Side> {
    let deviation = snapshot.gps.heading_deviation?;
    if deviation > 0.0 {
        Some(Side::Left)
    } else if deviation < 0.0 {
        Some(Side::Right)
    } else {
        None
    }
}

/// Pick an escape side among the free ones
///
/// Policy: (i) exactly one side clears the threshold, take it; (ii) both
/// clear it, take the GPS-consistent side when a correction direction is
/// known, the wider side otherwise; (iii) neither clears it, `None` (the
/// caller warns to stop).
pub fn pick_free_side(snapshot: &DecisionSnapshot, free_threshold_m: f64) -> Option<Side> {
    let left_free = snapshot.left > free_threshold_m;
    let right_free = snapshot.right > free_threshold_m;

    match (left_free, right_free) {
        (true, false) => Some(Side::Left),
        (false, true) => Some(Side::Right),
        (true, true) => gps_correction_side(snapshot).or(Some(wider_side(snapshot))),
        (false, false) => None,
    }
}

/// Side with the larger clearance (ties go right, the servo sweeps there first)
pub fn wider_side(snapshot: &DecisionSnapshot) -> Side {
    if snapshot.left > snapshot.right {
        Side::Left
    } else {
        Side::Right
    }
}
