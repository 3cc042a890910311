//! Results accumulator.
//!
//! [`Accumulator::record`] is the only way any field of the
//! [`ResultsRecord`] is written. Every call either applies completely or
//! is rejected before anything changes.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RecordError;
use crate::randomization::SessionSeed;
use crate::study::{Condition, ConditionOrder, FinalAnswers, QuestionSet, SurveyAnswers};

/// Wall-clock source for timestamps.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Formats a timestamp the way exports store it (`2024-05-01T10:00:00.000Z`).
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Named points in a session that get a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Milestone {
    /// Session created
    Start,
    /// Consent given
    IntroComplete,
    /// Condition view finished
    ViewComplete(Condition),
    /// Condition survey submitted
    SurveyComplete(Condition),
    /// Comparison submitted
    ComparisonComplete,
}

impl Milestone {
    /// Key under which the milestone's timestamp is stored.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::IntroComplete => "intro_complete",
            Self::ViewComplete(Condition::Transparent) => "transparent_view_complete",
            Self::ViewComplete(Condition::Opaque) => "opaque_view_complete",
            Self::SurveyComplete(Condition::Transparent) => "transparent_survey_complete",
            Self::SurveyComplete(Condition::Opaque) => "opaque_survey_complete",
            Self::ComparisonComplete => "comparison_complete",
        }
    }
}

/// A single write into the results record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordEvent {
    /// Timestamp the milestone (overwrites an earlier stamp of the same key).
    Milestone(Milestone),
    /// Store a condition's survey answers (write-once per condition).
    SurveyScores {
        /// Condition the answers belong to
        condition: Condition,
        /// The answers
        answers: SurveyAnswers,
    },
    /// Store the comparison answers (write-once).
    FinalPreference(FinalAnswers),
}

/// The accumulated results of one session, in export shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsRecord {
    participant_id: String,
    condition_order: ConditionOrder,
    transparent_scores: Option<SurveyAnswers>,
    opaque_scores: Option<SurveyAnswers>,
    final_preference: Option<FinalAnswers>,
    timestamps: IndexMap<String, String>,
}

impl ResultsRecord {
    fn seeded(seed: &SessionSeed) -> Self {
        Self {
            participant_id: seed.participant_id().to_string(),
            condition_order: seed.condition_order(),
            transparent_scores: None,
            opaque_scores: None,
            final_preference: None,
            timestamps: IndexMap::new(),
        }
    }

    /// Participant identifier.
    #[must_use]
    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    /// Condition order for the session.
    #[must_use]
    pub const fn condition_order(&self) -> ConditionOrder {
        self.condition_order
    }

    /// Survey answers stored for a condition.
    #[must_use]
    pub const fn scores(&self, condition: Condition) -> Option<&SurveyAnswers> {
        match condition {
            Condition::Transparent => self.transparent_scores.as_ref(),
            Condition::Opaque => self.opaque_scores.as_ref(),
        }
    }

    /// Transparent-condition answers.
    #[must_use]
    pub const fn transparent_scores(&self) -> Option<&SurveyAnswers> {
        self.transparent_scores.as_ref()
    }

    /// Opaque-condition answers.
    #[must_use]
    pub const fn opaque_scores(&self) -> Option<&SurveyAnswers> {
        self.opaque_scores.as_ref()
    }

    /// Comparison answers.
    #[must_use]
    pub const fn final_preference(&self) -> Option<&FinalAnswers> {
        self.final_preference.as_ref()
    }

    /// Event name to ISO-8601 timestamp.
    #[must_use]
    pub const fn timestamps(&self) -> &IndexMap<String, String> {
        &self.timestamps
    }

    /// Timestamp recorded for a milestone.
    #[must_use]
    pub fn timestamp(&self, milestone: Milestone) -> Option<&str> {
        self.timestamps.get(milestone.key()).map(String::as_str)
    }
}

/// Sole writer of a session's [`ResultsRecord`].
pub struct Accumulator {
    record: ResultsRecord,
    questions: QuestionSet,
    clock: Arc<dyn Clock>,
}

impl Accumulator {
    /// Creates the record from the session seed and stamps `start`.
    #[must_use]
    pub fn new(seed: &SessionSeed, questions: QuestionSet, clock: Arc<dyn Clock>) -> Self {
        let mut acc = Self {
            record: ResultsRecord::seeded(seed),
            questions,
            clock,
        };
        acc.stamp(Milestone::Start);
        acc
    }

    /// Applies one event.
    ///
    /// Timestamps always overwrite by key. Answer fields are write-once
    /// and survey answers must cover exactly the condition's questions.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::AlreadyRecorded`] for a second write to an
    /// answer field and [`RecordError::MalformedPayload`] for incomplete
    /// survey answers. Nothing is written in either case.
    pub fn record(&mut self, event: RecordEvent) -> Result<(), RecordError> {
        match event {
            RecordEvent::Milestone(milestone) => {
                self.stamp(milestone);
                Ok(())
            }
            RecordEvent::SurveyScores { condition, answers } => {
                answers
                    .check_complete(self.questions.for_condition(condition))
                    .map_err(|e| RecordError::MalformedPayload {
                        reason: e.to_string(),
                    })?;
                let (slot, field) = match condition {
                    Condition::Transparent => {
                        (&mut self.record.transparent_scores, "transparentScores")
                    }
                    Condition::Opaque => (&mut self.record.opaque_scores, "opaqueScores"),
                };
                if slot.is_some() {
                    return Err(RecordError::AlreadyRecorded { field });
                }
                debug!(field, "survey answers recorded");
                *slot = Some(answers);
                Ok(())
            }
            RecordEvent::FinalPreference(answers) => {
                if self.record.final_preference.is_some() {
                    return Err(RecordError::AlreadyRecorded {
                        field: "finalPreference",
                    });
                }
                debug!("final preference recorded");
                self.record.final_preference = Some(answers);
                Ok(())
            }
        }
    }

    fn stamp(&mut self, milestone: Milestone) {
        let at = format_timestamp(self.clock.now());
        debug!(event = milestone.key(), %at, "timestamp recorded");
        self.record
            .timestamps
            .insert(milestone.key().to_string(), at);
    }

    /// Read-only view of the live record.
    #[must_use]
    pub const fn record_ref(&self) -> &ResultsRecord {
        &self.record
    }

    /// Value copy of the record; later writes do not affect it.
    #[must_use]
    pub fn snapshot(&self) -> ResultsRecord {
        self.record.clone()
    }

    /// Question set the accumulator validates against.
    #[must_use]
    pub const fn questions(&self) -> &QuestionSet {
        &self.questions
    }
}

impl std::fmt::Debug for Accumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accumulator")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}
