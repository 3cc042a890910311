//! Non-interactive screen replaying a responses file.
//!
//! Responses are keyed by condition, so each survey's answers are
//! attributed by condition whatever order the session draws. Scripted
//! input passes through the same forms as typed input.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::info;

use crate::error::ScreenError;
use crate::export::ResultsSummary;
use crate::study::{Condition, Preference, ReasoningPreference};

use super::{
    ComparisonForm, Completion, ConditionView, ConsentForm, ResultsView, Screen, ScreenRequest,
    SurveyForm,
};

const fn default_consent() -> bool {
    true
}

const fn default_attempts() -> u32 {
    3
}

/// Scores given either positionally or by question text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScriptedScores {
    /// One score per question, in display order
    Ordered(Vec<i64>),
    /// Score per question text
    ByQuestion(IndexMap<String, i64>),
}

/// Scripted answers for one condition's survey.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedSurvey {
    /// Likert scores
    pub scores: ScriptedScores,
    /// Free-text comment
    #[serde(default)]
    pub comment: String,
}

/// Scripted comparison selections; a missing field is a missing selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedComparison {
    /// Overall preference
    pub preferred: Option<Preference>,
    /// Trustworthiness
    pub trustworthy: Option<Preference>,
    /// Reasoning preference
    pub reasoning: Option<ReasoningPreference>,
}

/// A complete responses file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedResponses {
    /// Whether the participant consents
    #[serde(default = "default_consent")]
    pub consent: bool,
    /// Answers after the transparent condition
    pub transparent: ScriptedSurvey,
    /// Answers after the opaque condition
    pub opaque: ScriptedSurvey,
    /// Comparison selections
    #[serde(default)]
    pub comparison: ScriptedComparison,
    /// Analysis attempts per condition view before giving up
    #[serde(default = "default_attempts")]
    pub analysis_attempts: u32,
}

impl ScriptedResponses {
    /// Parses responses from YAML (or JSON) text.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::Script`] when the text is not a responses file.
    pub fn parse(text: &str) -> Result<Self, ScreenError> {
        serde_yaml::from_str(text).map_err(|e| ScreenError::Script {
            reason: e.to_string(),
        })
    }

    /// Loads a responses file.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenError::Io`] if the file cannot be read and
    /// [`ScreenError::Script`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, ScreenError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text).map_err(|e| match e {
            ScreenError::Script { reason } => ScreenError::Script {
                reason: format!("{}: {reason}", path.display()),
            },
            other => other,
        })
    }

    /// Survey answers for a condition.
    #[must_use]
    pub const fn survey(&self, condition: Condition) -> &ScriptedSurvey {
        match condition {
            Condition::Transparent => &self.transparent,
            Condition::Opaque => &self.opaque,
        }
    }
}

/// Screen that answers every phase from a [`ScriptedResponses`].
#[derive(Debug)]
pub struct ScriptedScreen {
    responses: ScriptedResponses,
    results: Option<(ResultsSummary, PathBuf)>,
}

impl ScriptedScreen {
    /// Creates a screen over parsed responses.
    #[must_use]
    pub const fn new(responses: ScriptedResponses) -> Self {
        Self {
            responses,
            results: None,
        }
    }

    /// Summary and export path shown on the results screen, once reached.
    #[must_use]
    pub fn results(&self) -> Option<(&ResultsSummary, &Path)> {
        self.results
            .as_ref()
            .map(|(summary, path)| (summary, path.as_path()))
    }

    fn fill_survey(
        &self,
        condition: Condition,
        questions: &[String],
    ) -> Result<Completion, ScreenError> {
        let scripted = self.responses.survey(condition);
        let mut form = SurveyForm::new(questions);
        match &scripted.scores {
            ScriptedScores::Ordered(values) => {
                for (index, value) in values.iter().enumerate() {
                    form.set_score_at(index, *value)?;
                }
            }
            ScriptedScores::ByQuestion(values) => {
                for (question, value) in values {
                    form.set_score(question, *value)?;
                }
            }
        }
        form.set_comment(scripted.comment.clone());
        Ok(Completion::SurveySubmitted(form.submit()?))
    }
}

#[async_trait]
impl Screen for ScriptedScreen {
    async fn present(&mut self, request: ScreenRequest<'_>) -> Result<Completion, ScreenError> {
        match request {
            ScreenRequest::Introduction { .. } => {
                let mut form = ConsentForm::default();
                form.set_consent(self.responses.consent);
                form.submit()?;
                Ok(Completion::Consented)
            }
            ScreenRequest::ConditionView(ctx) => {
                let limit = self.responses.analysis_attempts.max(1);
                let mut view = ConditionView::new(ctx);
                loop {
                    match view.analyze().await {
                        Ok(()) => break,
                        Err(e) if view.attempts() >= limit => return Err(e.into()),
                        Err(_) => {}
                    }
                }
                Ok(view.finish()?)
            }
            ScreenRequest::Survey {
                condition,
                questions,
            } => self.fill_survey(condition, questions),
            ScreenRequest::Comparison { .. } => {
                let scripted = self.responses.comparison;
                let form = ComparisonForm {
                    preferred: scripted.preferred,
                    trustworthy: scripted.trustworthy,
                    reasoning: scripted.reasoning,
                };
                Ok(Completion::ComparisonSubmitted(form.submit()?))
            }
        }
    }

    async fn show_results(&mut self, results: ResultsView<'_>) -> Result<(), ScreenError> {
        info!(
            participant_id = results.record.participant_id(),
            transparent_average = results.summary.transparent_average,
            opaque_average = results.summary.opaque_average,
            path = %results.export_path.display(),
            "scripted session complete"
        );
        self.results = Some((results.summary.clone(), results.export_path.to_path_buf()));
        Ok(())
    }
}
