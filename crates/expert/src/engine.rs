//! Expert engine: first-match evaluation with deduplication.

use contracts::{CoreError, DecisionSnapshot, Instruction};
use tracing::{debug, instrument, trace};

use crate::rule::GuidanceRule;
use crate::rules::default_rules;

/// Outcome of one engine evaluation
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Name of the rule that matched
    pub rule_name: &'static str,

    /// Priority of the rule that matched
    pub priority: i32,

    /// Instruction to speak; `None` when suppressed as a duplicate
    pub instruction: Option<Instruction>,
}

/// Priority-ordered expert rule engine
///
/// Rules are kept sorted by descending priority; evaluation picks the
/// first matching rule. The engine caches the last emitted instruction
/// and suppresses identical non-immediate repetitions.
pub struct ExpertEngine {
    rules: Vec<Box<dyn GuidanceRule>>,
    last_instruction: Option<Instruction>,
}

impl ExpertEngine {
    /// Create an engine with a custom rule set
    pub fn new(mut rules: Vec<Box<dyn GuidanceRule>>) -> Self {
        rules.sort_by_key(|rule| std::cmp::Reverse(rule.priority()));
        Self {
            rules,
            last_instruction: None,
        }
    }

    /// Create an engine with the default rule set
    pub fn with_default_rules() -> Self {
        Self::new(default_rules())
    }

    /// Add a rule, keeping the ordering invariant
    pub fn push_rule(&mut self, rule: Box<dyn GuidanceRule>) {
        self.rules.push(rule);
        self.rules
            .sort_by_key(|rule| std::cmp::Reverse(rule.priority()));
    }

    /// Installed rule names in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Evaluate one snapshot
    ///
    /// Every rule observes the snapshot first (latch maintenance), then the
    /// highest-priority matching rule produces the instruction. Returns
    /// `NoRuleApplicable` only when no rule matches, which cannot happen
    /// while the fallback rule is installed.
    #[instrument(name = "engine_evaluate", level = "debug", skip(self, snapshot))]
    pub fn evaluate(&mut self, snapshot: &DecisionSnapshot) -> Result<Evaluation, CoreError> {
        for rule in &mut self.rules {
            rule.refresh(snapshot);
        }

        let rule = self
            .rules
            .iter_mut()
            .find(|rule| rule.matches(snapshot))
            .ok_or(CoreError::NoRuleApplicable)?;

        let rule_name = rule.name();
        let priority = rule.priority();
        let instruction = rule.apply(snapshot);

        debug!(
            rule = rule_name,
            priority,
            kind = ?instruction.kind,
            immediate = instruction.immediate,
            "rule matched"
        );

        if self.is_duplicate(&instruction) {
            trace!(rule = rule_name, "instruction suppressed as duplicate");
            return Ok(Evaluation {
                rule_name,
                priority,
                instruction: None,
            });
        }

        self.last_instruction = Some(instruction.clone());
        Ok(Evaluation {
            rule_name,
            priority,
            instruction: Some(instruction),
        })
    }

    /// Forget the deduplication cache
    ///
    /// One-shot latches are not touched; they clear themselves when their
    /// condition goes away.
    pub fn reset(&mut self) {
        self.last_instruction = None;
    }

    /// Emit iff no cache, or the new instruction preempts, or it differs
    /// in message or kind
    fn is_duplicate(&self, instruction: &Instruction) -> bool {
        match &self.last_instruction {
            None => false,
            Some(_) if instruction.immediate => false,
            Some(last) => last.message == instruction.message && last.kind == instruction.kind,
        }
    }
}

impl Default for ExpertEngine {
    fn default() -> Self {
        Self::with_default_rules()
    }
}
