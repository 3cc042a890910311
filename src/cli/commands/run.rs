//! Session command handler.
//!
//! Wires the study configuration, analyzer, screen, event sink and
//! session seed together and hands them to [`StudyRunner`].

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::analysis::{GeminiAnalyzer, PolicyAnalyzer};
use crate::cli::args::{AnalyzerKind, RunArgs};
use crate::config::StudyConfig;
use crate::error::{EntropyError, StudyError};
use crate::observability::EventEmitter;
use crate::randomization::SessionSeed;
use crate::runner::StudyRunner;
use crate::screen::{Screen, ScriptedResponses, ScriptedScreen, TerminalScreen};

/// Run one participant session.
///
/// # Errors
///
/// Returns a configuration error for an unloadable study, an analysis
/// error when the Gemini backend lacks a key, an entropy error when no
/// seed can be drawn, or any session error raised by the runner.
pub async fn run(args: &RunArgs) -> Result<(), StudyError> {
    let study = super::load_study(args.study.as_deref(), args.strict)?;
    let analyzer = build_analyzer(args, &study)?;

    let (seed, mut rng) = match args.seed {
        Some(value) => {
            tracing::info!(seed = value, "using deterministic session seed");
            let mut rng = StdRng::seed_from_u64(value);
            (SessionSeed::from_rng(&mut rng), rng)
        }
        None => {
            let seed = SessionSeed::from_os_entropy()?;
            let rng = StdRng::try_from_os_rng().map_err(|e| EntropyError(e.to_string()))?;
            (seed, rng)
        }
    };

    let events = match &args.events_file {
        Some(path) => EventEmitter::from_file(path)?,
        None => EventEmitter::noop(),
    };

    let runner = StudyRunner::new(&study, analyzer.as_ref(), &args.output_dir)
        .with_events(Arc::new(events));
    let document = runner.select_document(&mut rng)?;
    if args.analyzer == AnalyzerKind::Canned && !study.has_canned_analysis(&document.id) {
        tracing::warn!(
            document = %document.id,
            "no canned analysis for the selected document; the condition view will fail"
        );
    }

    let mut screen: Box<dyn Screen> = match &args.responses {
        Some(path) => Box::new(ScriptedScreen::new(ScriptedResponses::load(path)?)),
        None => Box::new(TerminalScreen::stdio()),
    };

    let outcome = runner.run(screen.as_mut(), seed, document).await?;
    tracing::info!(
        participant_id = outcome.record.participant_id(),
        document = %outcome.document_id,
        path = %outcome.export_path.display(),
        "session complete"
    );
    Ok(())
}

fn build_analyzer(
    args: &RunArgs,
    study: &StudyConfig,
) -> Result<Box<dyn PolicyAnalyzer>, StudyError> {
    match args.analyzer {
        AnalyzerKind::Canned => Ok(Box::new(study.canned_analyzer())),
        AnalyzerKind::Gemini => {
            let key = args.gemini_api_key.clone().unwrap_or_default();
            let analyzer = GeminiAnalyzer::new(&args.gemini_endpoint, &args.gemini_model, key)?;
            tracing::info!(model = %args.gemini_model, "using Gemini analyzer");
            Ok(Box::new(analyzer))
        }
    }
}
