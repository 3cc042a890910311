//! Survey and comparison payloads.
//!
//! These are the typed payloads screens hand back to the controller.
//! [`SurveyAnswers::check_complete`] is the single completeness rule
//! shared by the survey form and the accumulator.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::study::Condition;

/// Minimum similarity for an unknown question to get a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// A 5-point Likert score (1 = strongly disagree, 5 = strongly agree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LikertScore(u8);

impl LikertScore {
    /// Lowest score on the scale.
    pub const MIN: u8 = 1;
    /// Highest score on the scale.
    pub const MAX: u8 = 5;

    /// Raw score value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for LikertScore {
    type Error = InputError;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(InputError::ScoreOutOfRange { value })
        }
    }
}

impl TryFrom<u8> for LikertScore {
    type Error = InputError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

impl From<LikertScore> for u8 {
    fn from(score: LikertScore) -> Self {
        score.0
    }
}

impl std::fmt::Display for LikertScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Answers to one condition's survey.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAnswers {
    /// Score per question text, in question order.
    pub scores: IndexMap<String, LikertScore>,
    /// Free-text feedback; empty when the participant left none.
    #[serde(default)]
    pub comment: String,
}

impl SurveyAnswers {
    /// Creates answers from already-collected scores.
    #[must_use]
    pub fn new(scores: IndexMap<String, LikertScore>, comment: impl Into<String>) -> Self {
        Self {
            scores,
            comment: comment.into(),
        }
    }

    /// Verifies that exactly the given questions have been scored.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::MissingScore`] for the first unanswered
    /// question, or [`InputError::UnknownQuestion`] for a score that does
    /// not belong to `questions`.
    pub fn check_complete(&self, questions: &[String]) -> Result<(), InputError> {
        if let Some(missing) = questions.iter().find(|q| !self.scores.contains_key(*q)) {
            return Err(InputError::MissingScore {
                question: missing.clone(),
            });
        }
        if let Some(extra) = self.scores.keys().find(|k| !questions.contains(k)) {
            return Err(InputError::UnknownQuestion {
                question: extra.clone(),
                suggestion: suggest_question(extra, questions),
            });
        }
        Ok(())
    }

    /// Mean score, or `0.0` when nothing was scored.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        let total: u32 = self.scores.values().map(|s| u32::from(s.value())).sum();
        f64::from(total) / self.scores.len() as f64
    }
}

/// Returns the known question closest to `given`, if it is close enough.
#[must_use]
pub fn suggest_question(given: &str, questions: &[String]) -> Option<String> {
    questions
        .iter()
        .map(|q| (q, strsim::normalized_levenshtein(given, q)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(q, _)| q.clone())
}

/// Which system a participant picked in the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    /// The transparent AI
    Transparent,
    /// The opaque AI
    Opaque,
    /// Neither
    NoPreference,
}

impl Preference {
    /// All choices, in presentation order.
    pub const ALL: [Self; 3] = [Self::Transparent, Self::Opaque, Self::NoPreference];

    /// Participant-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Transparent => "Transparent AI (with explanations)",
            Self::Opaque => "Opaque AI (without explanations)",
            Self::NoPreference => "No Preference",
        }
    }
}

impl From<Condition> for Preference {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Transparent => Self::Transparent,
            Condition::Opaque => Self::Opaque,
        }
    }
}

/// Whether a participant would rather see reasoning or bare decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningPreference {
    /// Prefers an AI that explains itself
    ShowsReasoning,
    /// Prefers an AI that only gives decisions
    JustDecisions,
    /// Neither
    NoPreference,
}

impl ReasoningPreference {
    /// All choices, in presentation order.
    pub const ALL: [Self; 3] = [Self::ShowsReasoning, Self::JustDecisions, Self::NoPreference];

    /// Participant-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ShowsReasoning => "Shows reasoning",
            Self::JustDecisions => "Just gives decisions",
            Self::NoPreference => "No Preference",
        }
    }
}

/// The three comparison answers. Every field is required by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalAnswers {
    /// Preferred system overall
    pub preferred: Preference,
    /// System that felt more trustworthy
    pub trustworthy: Preference,
    /// Reasoning versus decisions
    pub reasoning: ReasoningPreference,
}
