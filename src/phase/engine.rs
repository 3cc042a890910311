//! Study session controller.
//!
//! The `StudyEngine` is the sole interpreter of screen completions and
//! the sole owner of session state. It routes each survey's answers to
//! the score field of the condition that was active, not the visit slot.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::error::PhaseError;
use crate::observability::{Event, EventEmitter};
use crate::randomization::SessionSeed;
use crate::record::{Accumulator, Clock, Milestone, RecordEvent, ResultsRecord};
use crate::screen::Completion;
use crate::study::{Condition, ConditionOrder, QuestionSet};

use super::state::{Phase, PhaseTransition};

/// Phase controller for one participant session.
pub struct StudyEngine {
    /// Participant identifier (copied from the seed)
    participant_id: String,
    /// Counterbalanced order, fixed at start
    order: ConditionOrder,
    /// Current phase
    phase: Phase,
    /// Results accumulator; only written from `handle`
    accumulator: Accumulator,
    /// Every phase entered, starting with `Introduction`
    history: Vec<Phase>,
    /// Structured event sink
    events: Arc<EventEmitter>,
}

impl StudyEngine {
    /// Starts a session in `Introduction`.
    ///
    /// The seed is consumed so a session cannot be re-seeded.
    #[must_use]
    pub fn start(
        seed: SessionSeed,
        questions: QuestionSet,
        clock: Arc<dyn Clock>,
        events: Arc<EventEmitter>,
    ) -> Self {
        let accumulator = Accumulator::new(&seed, questions, clock);
        let participant_id = seed.participant_id().to_string();
        let order = seed.condition_order();

        info!(participant_id = %participant_id, condition_order = %order, "session started");
        events.emit(Event::SessionStarted {
            timestamp: Utc::now(),
            participant_id: participant_id.clone(),
            condition_order: order,
        });

        Self {
            participant_id,
            order,
            phase: Phase::Introduction,
            accumulator,
            history: vec![Phase::Introduction],
            events,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Condition active in the current phase, if condition-bound.
    #[must_use]
    pub fn active_condition(&self) -> Option<Condition> {
        self.phase.slot().map(|slot| self.order.at(slot))
    }

    /// Participant identifier.
    #[must_use]
    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    /// Counterbalanced condition order.
    #[must_use]
    pub const fn condition_order(&self) -> ConditionOrder {
        self.order
    }

    /// Phases entered so far, in order.
    #[must_use]
    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    /// Whether the session reached `Results`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Survey questions for a condition.
    #[must_use]
    pub fn questions_for(&self, condition: Condition) -> &[String] {
        self.accumulator.questions().for_condition(condition)
    }

    /// Read-only view of the live record.
    #[must_use]
    pub const fn record(&self) -> &ResultsRecord {
        self.accumulator.record_ref()
    }

    /// Value copy of the record for export.
    #[must_use]
    pub fn snapshot(&self) -> ResultsRecord {
        self.accumulator.snapshot()
    }

    /// Applies one screen completion.
    ///
    /// On success the completion's milestone is timestamped, any payload
    /// is stored, and the next phase is entered.
    ///
    /// # Errors
    ///
    /// - [`PhaseError::SessionComplete`] once the session is in `Results`
    /// - [`PhaseError::UnexpectedCompletion`] when the completion does not
    ///   belong to the current phase (repeated or out-of-order delivery)
    /// - [`PhaseError::Record`] when the accumulator refuses the payload
    ///
    /// The phase and record are unchanged on error.
    pub fn handle(&mut self, completion: Completion) -> Result<PhaseTransition, PhaseError> {
        match self.apply(completion) {
            Ok(transition) => {
                info!(
                    participant_id = %self.participant_id,
                    from = %transition.from,
                    to = %transition.to,
                    milestone = transition.milestone.key(),
                    "phase transition"
                );
                self.events.emit(Event::PhaseEntered {
                    timestamp: Utc::now(),
                    participant_id: self.participant_id.clone(),
                    phase: transition.to.to_string(),
                    condition: self.active_condition(),
                });
                Ok(transition)
            }
            Err(e) => {
                warn!(
                    participant_id = %self.participant_id,
                    phase = %self.phase,
                    error = %e,
                    "completion rejected"
                );
                self.events.emit(Event::CompletionRejected {
                    timestamp: Utc::now(),
                    participant_id: self.participant_id.clone(),
                    phase: self.phase.to_string(),
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn apply(&mut self, completion: Completion) -> Result<PhaseTransition, PhaseError> {
        let from = self.phase;
        let to = from.next().ok_or(PhaseError::SessionComplete)?;

        let milestone = match (from, completion) {
            (Phase::Introduction, Completion::Consented) => Milestone::IntroComplete,
            (Phase::Condition(slot), Completion::ConditionViewed) => {
                Milestone::ViewComplete(self.order.at(slot))
            }
            (Phase::Survey(slot), Completion::SurveySubmitted(answers)) => {
                let condition = self.order.at(slot);
                self.accumulator
                    .record(RecordEvent::SurveyScores { condition, answers })?;
                Milestone::SurveyComplete(condition)
            }
            (Phase::Comparison, Completion::ComparisonSubmitted(answers)) => {
                self.accumulator
                    .record(RecordEvent::FinalPreference(answers))?;
                Milestone::ComparisonComplete
            }
            (phase, other) => {
                return Err(PhaseError::UnexpectedCompletion {
                    phase,
                    completion: other.kind(),
                });
            }
        };

        self.accumulator.record(RecordEvent::Milestone(milestone))?;
        self.phase = to;
        self.history.push(to);

        Ok(PhaseTransition {
            from,
            to,
            milestone,
        })
    }
}

impl std::fmt::Debug for StudyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudyEngine")
            .field("participant_id", &self.participant_id)
            .field("order", &self.order)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
