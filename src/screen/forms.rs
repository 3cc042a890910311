//! Participant input forms.
//!
//! Forms hold in-progress input for a single visit and only yield a
//! completion payload once every required field is set. Front ends
//! parse raw text through the `parse_*` helpers so the same rules apply
//! to typed and scripted input.

use indexmap::IndexMap;

use crate::error::InputError;
use crate::study::{
    FinalAnswers, LikertScore, Preference, ReasoningPreference, SurveyAnswers, suggest_question,
};

/// Introduction consent gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsentForm {
    consented: bool,
}

impl ConsentForm {
    /// Records whether the consent box is ticked.
    pub const fn set_consent(&mut self, consented: bool) {
        self.consented = consented;
    }

    /// Whether the participant has consented.
    #[must_use]
    pub const fn is_consented(&self) -> bool {
        self.consented
    }

    /// Confirms the introduction.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::ConsentRequired`] without consent.
    pub const fn submit(&self) -> Result<(), InputError> {
        if self.consented {
            Ok(())
        } else {
            Err(InputError::ConsentRequired)
        }
    }
}

/// Likert survey for one condition.
#[derive(Debug, Clone)]
pub struct SurveyForm<'a> {
    questions: &'a [String],
    scores: IndexMap<String, LikertScore>,
    comment: String,
}

impl<'a> SurveyForm<'a> {
    /// Creates an empty form over the condition's questions.
    #[must_use]
    pub fn new(questions: &'a [String]) -> Self {
        Self {
            questions,
            scores: IndexMap::new(),
            comment: String::new(),
        }
    }

    /// Questions in display order.
    #[must_use]
    pub const fn questions(&self) -> &'a [String] {
        self.questions
    }

    /// Scores a question by its text.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::UnknownQuestion`] (with a close match, if
    /// any) or [`InputError::ScoreOutOfRange`].
    pub fn set_score(&mut self, question: &str, value: i64) -> Result<(), InputError> {
        let Some(known) = self.questions.iter().find(|q| *q == question) else {
            return Err(InputError::UnknownQuestion {
                question: question.to_string(),
                suggestion: suggest_question(question, self.questions),
            });
        };
        let score = LikertScore::try_from(value)?;
        self.scores.insert(known.clone(), score);
        Ok(())
    }

    /// Scores the question at `index` in display order.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::ScoreOutOfRange`] for a bad value, or
    /// [`InputError::UnknownQuestion`] for an index past the last question.
    pub fn set_score_at(&mut self, index: usize, value: i64) -> Result<(), InputError> {
        let Some(question) = self.questions.get(index) else {
            return Err(InputError::UnknownQuestion {
                question: format!("#{}", index + 1),
                suggestion: None,
            });
        };
        let score = LikertScore::try_from(value)?;
        self.scores.insert(question.clone(), score);
        Ok(())
    }

    /// Sets the free-text comment.
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into().trim().to_string();
    }

    /// First question still lacking a score.
    #[must_use]
    pub fn next_unanswered(&self) -> Option<&'a str> {
        self.questions
            .iter()
            .find(|q| !self.scores.contains_key(*q))
            .map(String::as_str)
    }

    /// Whether every question has a score.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.next_unanswered().is_none()
    }

    /// Produces the answers, with scores in question order.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::MissingScore`] for the first unanswered question.
    pub fn submit(&self) -> Result<SurveyAnswers, InputError> {
        let mut ordered = IndexMap::with_capacity(self.questions.len());
        for question in self.questions {
            let score = self
                .scores
                .get(question)
                .ok_or_else(|| InputError::MissingScore {
                    question: question.clone(),
                })?;
            ordered.insert(question.clone(), *score);
        }
        Ok(SurveyAnswers::new(ordered, self.comment.clone()))
    }
}

/// Final comparison selections.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonForm {
    /// Overall preference
    pub preferred: Option<Preference>,
    /// Trustworthiness
    pub trustworthy: Option<Preference>,
    /// Reasoning preference
    pub reasoning: Option<ReasoningPreference>,
}

impl ComparisonForm {
    /// Produces the answers once all three selections are made.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::MissingSelection`] naming the first unset field.
    pub const fn submit(&self) -> Result<FinalAnswers, InputError> {
        let Some(preferred) = self.preferred else {
            return Err(InputError::MissingSelection { field: "preferred" });
        };
        let Some(trustworthy) = self.trustworthy else {
            return Err(InputError::MissingSelection {
                field: "trustworthy",
            });
        };
        let Some(reasoning) = self.reasoning else {
            return Err(InputError::MissingSelection { field: "reasoning" });
        };
        Ok(FinalAnswers {
            preferred,
            trustworthy,
            reasoning,
        })
    }
}

/// Parses a typed Likert score.
///
/// # Errors
///
/// Returns [`InputError::InvalidChoice`] for non-numeric input and
/// [`InputError::ScoreOutOfRange`] for numbers outside 1-5.
pub fn parse_score(input: &str) -> Result<LikertScore, InputError> {
    let trimmed = input.trim();
    let value: i64 = trimmed.parse().map_err(|_| InputError::InvalidChoice {
        input: trimmed.to_string(),
        expected: "a number from 1 to 5".to_string(),
    })?;
    LikertScore::try_from(value)
}

/// Parses a yes/no answer.
///
/// # Errors
///
/// Returns [`InputError::InvalidChoice`] for anything else.
pub fn parse_yes_no(input: &str) -> Result<bool, InputError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        other => Err(InputError::InvalidChoice {
            input: other.to_string(),
            expected: "yes or no".to_string(),
        }),
    }
}

/// Parses a system preference by menu number or name.
///
/// # Errors
///
/// Returns [`InputError::InvalidChoice`] for unrecognized input.
pub fn parse_preference(input: &str) -> Result<Preference, InputError> {
    match normalize(input).as_str() {
        "1" | "transparent" => Ok(Preference::Transparent),
        "2" | "opaque" => Ok(Preference::Opaque),
        "3" | "none" | "no_preference" => Ok(Preference::NoPreference),
        other => Err(InputError::InvalidChoice {
            input: other.to_string(),
            expected: "1 (transparent), 2 (opaque) or 3 (no preference)".to_string(),
        }),
    }
}

/// Parses a reasoning preference by menu number or name.
///
/// # Errors
///
/// Returns [`InputError::InvalidChoice`] for unrecognized input.
pub fn parse_reasoning(input: &str) -> Result<ReasoningPreference, InputError> {
    match normalize(input).as_str() {
        "1" | "shows_reasoning" | "reasoning" => Ok(ReasoningPreference::ShowsReasoning),
        "2" | "just_decisions" | "decisions" => Ok(ReasoningPreference::JustDecisions),
        "3" | "none" | "no_preference" => Ok(ReasoningPreference::NoPreference),
        other => Err(InputError::InvalidChoice {
            input: other.to_string(),
            expected: "1 (shows reasoning), 2 (just decisions) or 3 (no preference)".to_string(),
        }),
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase().replace([' ', '-'], "_")
}
