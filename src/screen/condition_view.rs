//! Condition view sub-state.
//!
//! A condition visit shows the policy, runs the analysis on request,
//! and only lets the participant continue once an analysis is shown.
//! Failed attempts leave the view retryable; session state is never
//! touched from here.

use std::fmt::Write as _;

use chrono::Utc;
use tracing::{debug, warn};

use crate::analysis::{
    AnalysisReport, PolicyAnalyzer, PolicyDocument, PolicySegment, Recommendation,
};
use crate::error::{AnalysisError, InputError};
use crate::observability::{Event, EventEmitter};
use crate::study::Condition;

use super::Completion;

/// Everything a condition view needs from the session.
#[derive(Clone, Copy)]
pub struct ConditionContext<'a> {
    /// Condition being presented
    pub condition: Condition,
    /// Document under review
    pub document: &'a PolicyDocument,
    /// Analysis collaborator
    pub analyzer: &'a dyn PolicyAnalyzer,
    /// Disclosure shown with the transparent analysis
    pub bias_disclosure: &'a str,
    /// Event sink for failed attempts
    pub events: &'a EventEmitter,
}

impl std::fmt::Debug for ConditionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionContext")
            .field("condition", &self.condition)
            .field("document", &self.document.id)
            .field("analyzer", &self.analyzer.name())
            .finish_non_exhaustive()
    }
}

/// Analysis progress within one condition visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisState {
    /// Not yet requested
    Pending,
    /// Last attempt failed with this message
    Failed(String),
    /// Analysis available to the participant
    Shown(AnalysisReport),
}

/// One condition visit.
#[derive(Debug)]
pub struct ConditionView<'a> {
    ctx: ConditionContext<'a>,
    state: AnalysisState,
    attempts: u32,
}

impl<'a> ConditionView<'a> {
    /// Creates a view in the `Pending` state.
    #[must_use]
    pub const fn new(ctx: ConditionContext<'a>) -> Self {
        Self {
            ctx,
            state: AnalysisState::Pending,
            attempts: 0,
        }
    }

    /// Condition being presented.
    #[must_use]
    pub const fn condition(&self) -> Condition {
        self.ctx.condition
    }

    /// Document under review.
    #[must_use]
    pub const fn document(&self) -> &'a PolicyDocument {
        self.ctx.document
    }

    /// Current analysis state.
    #[must_use]
    pub const fn state(&self) -> &AnalysisState {
        &self.state
    }

    /// Number of analysis attempts made so far.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The shown report, if any.
    #[must_use]
    pub const fn report(&self) -> Option<&AnalysisReport> {
        match &self.state {
            AnalysisState::Shown(report) => Some(report),
            _ => None,
        }
    }

    /// Runs (or retries) the analysis.
    ///
    /// A no-op once an analysis is shown.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's error; the view moves to `Failed` and
    /// may be retried.
    pub async fn analyze(&mut self) -> Result<(), AnalysisError> {
        if self.report().is_some() {
            return Ok(());
        }
        self.attempts += 1;
        debug!(
            condition = %self.ctx.condition,
            analyzer = self.ctx.analyzer.name(),
            attempt = self.attempts,
            "requesting analysis"
        );
        match self.ctx.analyzer.analyze(self.ctx.document).await {
            Ok(report) => {
                self.state = AnalysisState::Shown(report);
                Ok(())
            }
            Err(e) => {
                warn!(
                    condition = %self.ctx.condition,
                    document = %self.ctx.document.id,
                    attempt = self.attempts,
                    error = %e,
                    "analysis failed"
                );
                self.ctx.events.emit(Event::AnalysisFailed {
                    timestamp: Utc::now(),
                    condition: self.ctx.condition,
                    document: self.ctx.document.id.clone(),
                    error: e.to_string(),
                });
                self.state = AnalysisState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Finishes the visit.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::AnalysisPending`] until an analysis is shown.
    pub const fn finish(&self) -> Result<Completion, InputError> {
        match self.state {
            AnalysisState::Shown(_) => Ok(Completion::ConditionViewed),
            _ => Err(InputError::AnalysisPending),
        }
    }

    /// Renders the view for the current state.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.state {
            AnalysisState::Shown(report) => match self.ctx.condition {
                Condition::Transparent => {
                    render_transparent(self.ctx.document, report, self.ctx.bias_disclosure)
                }
                Condition::Opaque => render_opaque(self.ctx.document, report),
            },
            AnalysisState::Failed(message) => {
                format!("{}\n\nAnalysis failed: {message}\n", render_document(self.ctx.document))
            }
            AnalysisState::Pending => render_document(self.ctx.document),
        }
    }
}

/// Plain policy text without any analysis.
#[must_use]
pub fn render_document(document: &PolicyDocument) -> String {
    let mut out = format!("== {} ==\n", document.title);
    for segment in &document.segments {
        match segment {
            PolicySegment::Heading { content } => {
                let _ = writeln!(out, "\n## {content}");
            }
            PolicySegment::Paragraph { content } => {
                let _ = writeln!(out, "\n{content}");
            }
            PolicySegment::Clause { id, content } => {
                let _ = writeln!(out, "\n[{id}] {content}");
            }
        }
    }
    out
}

/// Policy annotated with per-clause rationale, the full conclusion and
/// the analyzer's bias disclosure.
#[must_use]
pub fn render_transparent(
    document: &PolicyDocument,
    report: &AnalysisReport,
    bias_disclosure: &str,
) -> String {
    let mut out = format!("== {} (Transparent AI) ==\n", document.title);
    for segment in &document.segments {
        match segment {
            PolicySegment::Heading { content } => {
                let _ = writeln!(out, "\n## {content}");
            }
            PolicySegment::Paragraph { content } => {
                let _ = writeln!(out, "\n{content}");
            }
            PolicySegment::Clause { id, content } => {
                let _ = writeln!(out, "\n[{id}] {content}");
                if let Some(analysis) = report.for_clause(*id) {
                    let _ = writeln!(
                        out,
                        "    -> {}: {}",
                        analysis.verdict.label(),
                        analysis.explanation
                    );
                }
            }
        }
    }
    let _ = writeln!(
        out,
        "\nRecommendation: {}\n\n{}\n\nVerdict: {}\n\nAbout this AI: {bias_disclosure}",
        recommendation_label(report.conclusion.recommendation),
        report.conclusion.summary,
        report.conclusion.final_verdict,
    );
    out
}

/// Policy with clause flags and the bare recommendation only.
#[must_use]
pub fn render_opaque(document: &PolicyDocument, report: &AnalysisReport) -> String {
    let mut out = format!("== {} (Opaque AI) ==\n", document.title);
    for segment in &document.segments {
        match segment {
            PolicySegment::Heading { content } => {
                let _ = writeln!(out, "\n## {content}");
            }
            PolicySegment::Paragraph { content } => {
                let _ = writeln!(out, "\n{content}");
            }
            PolicySegment::Clause { id, content } => {
                let flag = report
                    .for_clause(*id)
                    .map_or("", |analysis| analysis.verdict.label());
                let _ = writeln!(out, "\n[{id}] {content}");
                if !flag.is_empty() {
                    let _ = writeln!(out, "    -> {flag}");
                }
            }
        }
    }
    let _ = writeln!(
        out,
        "\nRecommendation: {}",
        recommendation_label(report.conclusion.recommendation)
    );
    out
}

const fn recommendation_label(recommendation: Recommendation) -> &'static str {
    match recommendation {
        Recommendation::Agree => "Agree",
        Recommendation::Disagree => "Disagree",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::analysis::{CannedAnalyzer, ClauseVerdict};
    use crate::study::content::{BIAS_DISCLOSURE, builtin_document, builtin_report};

    /// Fails a fixed number of times, then serves the built-in report.
    struct FlakyAnalyzer {
        failures_left: AtomicU32,
    }

    #[async_trait::async_trait]
    impl PolicyAnalyzer for FlakyAnalyzer {
        async fn analyze(
            &self,
            _document: &PolicyDocument,
        ) -> crate::analysis::Result<AnalysisReport> {
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(AnalysisError::Request("connection reset".into()));
            }
            Ok(builtin_report())
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    #[tokio::test]
    async fn continue_is_gated_on_analysis() {
        let document = builtin_document();
        let analyzer = CannedAnalyzer::builtin();
        let events = EventEmitter::noop();
        let mut view = ConditionView::new(ConditionContext {
            condition: Condition::Transparent,
            document: &document,
            analyzer: &analyzer,
            bias_disclosure: BIAS_DISCLOSURE,
            events: &events,
        });

        assert_eq!(view.finish(), Err(InputError::AnalysisPending));
        view.analyze().await.unwrap();
        assert_eq!(view.finish(), Ok(Completion::ConditionViewed));

        view.analyze().await.unwrap();
        assert_eq!(view.attempts(), 1);
    }

    #[tokio::test]
    async fn failure_is_retryable() {
        let document = builtin_document();
        let analyzer = FlakyAnalyzer {
            failures_left: AtomicU32::new(2),
        };
        let events = EventEmitter::noop();
        let mut view = ConditionView::new(ConditionContext {
            condition: Condition::Opaque,
            document: &document,
            analyzer: &analyzer,
            bias_disclosure: BIAS_DISCLOSURE,
            events: &events,
        });

        assert!(view.analyze().await.is_err());
        assert!(matches!(view.state(), AnalysisState::Failed(_)));
        assert!(view.finish().is_err());
        assert!(view.render().contains("Analysis failed"));

        assert!(view.analyze().await.is_err());
        view.analyze().await.unwrap();
        assert_eq!(view.attempts(), 3);
        assert!(view.finish().is_ok());
        assert_eq!(events.event_count(), 2);
    }

    #[test]
    fn transparent_shows_reasoning_and_opaque_does_not() {
        let document = builtin_document();
        let report = builtin_report();
        let explanation = &report.analysis[0].explanation;

        let transparent = render_transparent(&document, &report, BIAS_DISCLOSURE);
        assert!(transparent.contains(explanation.as_str()));
        assert!(transparent.contains(&report.conclusion.summary));
        assert!(transparent.contains(BIAS_DISCLOSURE));

        let opaque = render_opaque(&document, &report);
        assert!(!opaque.contains(explanation.as_str()));
        assert!(!opaque.contains(&report.conclusion.summary));
        assert!(!opaque.contains(BIAS_DISCLOSURE));
        assert!(opaque.contains(ClauseVerdict::Concerning.label()));
        assert!(opaque.contains("Recommendation: Disagree"));
    }
}
