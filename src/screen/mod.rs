//! Screen contract.
//!
//! A screen renders one phase and reports exactly one [`Completion`]
//! per visit. Screens own every participant-facing retry: a completion
//! is only produced once the screen's own gate (consent, analysis shown,
//! every question answered, every selection made) is satisfied.

pub mod condition_view;
pub mod forms;
pub mod scripted;
pub mod terminal;

use std::path::Path;

use async_trait::async_trait;

use crate::analysis::PolicyDocument;
use crate::error::ScreenError;
use crate::export::ResultsSummary;
use crate::record::ResultsRecord;
use crate::study::{ComparisonPrompts, Condition, FinalAnswers, SurveyAnswers};

pub use condition_view::{AnalysisState, ConditionContext, ConditionView};
pub use forms::{ComparisonForm, ConsentForm, SurveyForm};
pub use scripted::{ScriptedResponses, ScriptedScreen};
pub use terminal::TerminalScreen;

/// Typed completion message reported by a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Consent given and confirmed
    Consented,
    /// Condition view finished after the analysis was shown
    ConditionViewed,
    /// Survey submitted with complete answers
    SurveySubmitted(SurveyAnswers),
    /// Comparison submitted with all three selections
    ComparisonSubmitted(FinalAnswers),
}

impl Completion {
    /// Short name of the completion kind, used in errors and events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Consented => "consent",
            Self::ConditionViewed => "condition_view",
            Self::SurveySubmitted(_) => "survey",
            Self::ComparisonSubmitted(_) => "comparison",
        }
    }
}

/// Inputs a screen needs to render one phase.
#[derive(Debug)]
pub enum ScreenRequest<'a> {
    /// Study introduction and consent
    Introduction {
        /// Introductory text
        text: &'a str,
        /// Statement the participant consents to
        consent: &'a str,
    },
    /// Policy review under one condition
    ConditionView(ConditionContext<'a>),
    /// Likert survey for the condition just reviewed
    Survey {
        /// Condition the answers belong to
        condition: Condition,
        /// Statements to score, in display order
        questions: &'a [String],
    },
    /// Final comparison
    Comparison {
        /// Prompts for the three selections
        prompts: &'a ComparisonPrompts,
    },
}

impl ScreenRequest<'_> {
    /// Name of the phase being rendered.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Introduction { .. } => "introduction",
            Self::ConditionView(_) => "condition",
            Self::Survey { .. } => "survey",
            Self::Comparison { .. } => "comparison",
        }
    }
}

/// What the results screen shows once the export has been written.
#[derive(Debug, Clone, Copy)]
pub struct ResultsView<'a> {
    /// Final record snapshot
    pub record: &'a ResultsRecord,
    /// Per-condition averages
    pub summary: &'a ResultsSummary,
    /// Where the export was written
    pub export_path: &'a Path,
    /// Document reviewed in both conditions
    pub document: &'a PolicyDocument,
}

/// A participant-facing front end.
#[async_trait]
pub trait Screen: Send {
    /// Renders one phase and waits for its completion.
    ///
    /// # Errors
    ///
    /// Returns a [`ScreenError`] when the screen cannot produce a
    /// completion at all (closed input, exhausted script, I/O failure).
    async fn present(&mut self, request: ScreenRequest<'_>) -> Result<Completion, ScreenError>;

    /// Renders the terminal results phase.
    ///
    /// # Errors
    ///
    /// Returns a [`ScreenError`] if the results cannot be shown.
    async fn show_results(&mut self, results: ResultsView<'_>) -> Result<(), ScreenError>;
}
