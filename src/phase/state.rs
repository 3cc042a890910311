//! Phase representation and the fixed transition table.

use crate::record::Milestone;
use crate::study::Slot;

/// A stage of the session.
///
/// `Condition` and `Survey` carry the visit slot, so the seven visits of
/// a session are seven distinct values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Study introduction and consent.
    Introduction,
    /// Policy review under one condition.
    Condition(Slot),
    /// Survey about the condition just reviewed.
    Survey(Slot),
    /// Side-by-side comparison of both conditions.
    Comparison,
    /// Results and export (terminal).
    Results,
}

impl Phase {
    /// Every phase visit of a complete session, in order.
    pub const SEQUENCE: [Self; 7] = [
        Self::Introduction,
        Self::Condition(Slot::First),
        Self::Survey(Slot::First),
        Self::Condition(Slot::Second),
        Self::Survey(Slot::Second),
        Self::Comparison,
        Self::Results,
    ];

    /// The phase that follows this one, or `None` from `Results`.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Introduction => Some(Self::Condition(Slot::First)),
            Self::Condition(slot) => Some(Self::Survey(slot)),
            Self::Survey(slot) => match slot.next() {
                Some(next) => Some(Self::Condition(next)),
                None => Some(Self::Comparison),
            },
            Self::Comparison => Some(Self::Results),
            Self::Results => None,
        }
    }

    /// Name of the phase without its slot.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::Condition(_) => "condition",
            Self::Survey(_) => "survey",
            Self::Comparison => "comparison",
            Self::Results => "results",
        }
    }

    /// Visit slot for condition-bound phases.
    #[must_use]
    pub const fn slot(self) -> Option<Slot> {
        match self {
            Self::Condition(slot) | Self::Survey(slot) => Some(slot),
            _ => None,
        }
    }

    /// Whether this is the terminal phase.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Results)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.slot() {
            Some(slot) => write!(f, "{}[{}]", self.name(), slot.index()),
            None => f.write_str(self.name()),
        }
    }
}

/// Record of an accepted completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    /// Phase that was completed
    pub from: Phase,
    /// Phase now active
    pub to: Phase,
    /// Milestone timestamped by the transition
    pub milestone: Milestone,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_walks_the_sequence() {
        let mut walked = vec![Phase::Introduction];
        let mut phase = Phase::Introduction;
        while let Some(next) = phase.next() {
            walked.push(next);
            phase = next;
        }
        assert_eq!(walked, Phase::SEQUENCE.to_vec());
    }

    #[test]
    fn only_results_is_terminal() {
        for phase in Phase::SEQUENCE {
            assert_eq!(phase.is_terminal(), phase == Phase::Results);
            assert_eq!(phase.next().is_none(), phase.is_terminal());
        }
    }

    #[test]
    fn display_includes_slot() {
        assert_eq!(Phase::Condition(Slot::First).to_string(), "condition[0]");
        assert_eq!(Phase::Survey(Slot::Second).to_string(), "survey[1]");
        assert_eq!(Phase::Comparison.to_string(), "comparison");
    }

    #[test]
    fn five_phase_kinds_over_seven_visits() {
        let kinds: std::collections::HashSet<_> =
            Phase::SEQUENCE.iter().map(|p| p.name()).collect();
        assert_eq!(kinds.len(), 5);
    }
}
