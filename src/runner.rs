//! Session runner.
//!
//! Drives a [`Screen`] through one session: asks the engine for the
//! current phase, builds the screen's inputs, feeds the completion back,
//! and exports the record once `Results` is reached.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::info;

use crate::analysis::{PolicyAnalyzer, PolicyDocument};
use crate::config::StudyConfig;
use crate::error::{ConfigError, StudyError};
use crate::export::{self, ResultsSummary};
use crate::observability::{Event, EventEmitter};
use crate::phase::{Phase, StudyEngine};
use crate::randomization::SessionSeed;
use crate::record::{Clock, ResultsRecord, SystemClock};
use crate::screen::{ConditionContext, ResultsView, Screen, ScreenRequest};
use crate::study::content::{CONSENT_STATEMENT, INTRODUCTION};

/// Outcome of a completed session.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    /// Final record snapshot
    pub record: ResultsRecord,
    /// Headline figures
    pub summary: ResultsSummary,
    /// Export location
    pub export_path: PathBuf,
    /// Document reviewed in both conditions
    pub document_id: String,
}

/// Runs sessions against a study configuration.
pub struct StudyRunner<'a> {
    study: &'a StudyConfig,
    analyzer: &'a dyn PolicyAnalyzer,
    output_dir: PathBuf,
    clock: Arc<dyn Clock>,
    events: Arc<EventEmitter>,
}

impl<'a> StudyRunner<'a> {
    /// Creates a runner writing exports to `output_dir`.
    #[must_use]
    pub fn new(
        study: &'a StudyConfig,
        analyzer: &'a dyn PolicyAnalyzer,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            study,
            analyzer,
            output_dir: output_dir.into(),
            clock: Arc::new(SystemClock),
            events: Arc::new(EventEmitter::noop()),
        }
    }

    /// Replaces the timestamp clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<EventEmitter>) -> Self {
        self.events = events;
        self
    }

    /// Export directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Picks the session's document using the session RNG.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when no documents are configured.
    pub fn select_document<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<&'a PolicyDocument, StudyError> {
        let study: &'a StudyConfig = self.study;
        study.select_document(rng).ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "documents".to_string(),
                value: "[]".to_string(),
                expected: "at least one policy document".to_string(),
            }
            .into()
        })
    }

    /// Runs one session to completion and writes the export.
    ///
    /// # Errors
    ///
    /// Returns the screen's error if it cannot produce a completion, a
    /// [`StudyError::Phase`] if the engine rejects a completion (the
    /// screen broke its contract), or an I/O error from the export.
    pub async fn run<S>(
        &self,
        screen: &mut S,
        seed: SessionSeed,
        document: &PolicyDocument,
    ) -> Result<SessionOutcome, StudyError>
    where
        S: Screen + ?Sized,
    {
        let mut engine = StudyEngine::start(
            seed,
            self.study.questions.clone(),
            Arc::clone(&self.clock),
            Arc::clone(&self.events),
        );
        info!(
            participant_id = engine.participant_id(),
            document = %document.id,
            analyzer = self.analyzer.name(),
            "running session"
        );

        loop {
            let order = engine.condition_order();
            let request = match engine.phase() {
                Phase::Introduction => ScreenRequest::Introduction {
                    text: INTRODUCTION,
                    consent: CONSENT_STATEMENT,
                },
                Phase::Condition(slot) => ScreenRequest::ConditionView(ConditionContext {
                    condition: order.at(slot),
                    document,
                    analyzer: self.analyzer,
                    bias_disclosure: &self.study.bias_disclosure,
                    events: &self.events,
                }),
                Phase::Survey(slot) => {
                    let condition = order.at(slot);
                    ScreenRequest::Survey {
                        condition,
                        questions: self.study.questions.for_condition(condition),
                    }
                }
                Phase::Comparison => ScreenRequest::Comparison {
                    prompts: &self.study.comparison,
                },
                Phase::Results => break,
            };
            let completion = screen.present(request).await?;
            engine.handle(completion)?;
        }

        let record = engine.snapshot();
        let export_path = export::write_to_dir(&record, &self.output_dir)?;
        self.events.emit(Event::ResultsExported {
            timestamp: Utc::now(),
            participant_id: record.participant_id().to_string(),
            path: export_path.display().to_string(),
        });
        info!(
            participant_id = record.participant_id(),
            path = %export_path.display(),
            "results exported"
        );

        let summary = ResultsSummary::from_record(&record);
        screen
            .show_results(ResultsView {
                record: &record,
                summary: &summary,
                export_path: &export_path,
                document,
            })
            .await?;

        Ok(SessionOutcome {
            record,
            summary,
            export_path,
            document_id: document.id.clone(),
        })
    }
}

impl std::fmt::Debug for StudyRunner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudyRunner")
            .field("analyzer", &self.analyzer.name())
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}
