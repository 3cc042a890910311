//! Results export.
//!
//! The export is the only persisted artifact of a session: the record
//! snapshot as pretty-printed UTF-8 JSON in
//! `study-results-<participantId>.json`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::StudyError;
use crate::record::ResultsRecord;
use crate::study::{Condition, ConditionOrder, FinalAnswers, SurveyAnswers};

/// Prefix of every export file name.
pub const FILE_PREFIX: &str = "study-results-";

/// Export file name for a participant.
#[must_use]
pub fn file_name(participant_id: &str) -> String {
    format!("{FILE_PREFIX}{participant_id}.json")
}

/// Serializes a record in export form.
///
/// The same record always yields byte-identical output.
///
/// # Errors
///
/// Returns a serialization error (not expected for well-formed records).
pub fn to_pretty_json(record: &ResultsRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}

/// Writes the export into `dir`, creating the directory if needed.
///
/// Returns the path of the written file.
///
/// # Errors
///
/// Returns [`StudyError::Io`] if the directory or file cannot be written.
pub fn write_to_dir(record: &ResultsRecord, dir: &Path) -> Result<PathBuf, StudyError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name(record.participant_id()));
    let json = to_pretty_json(record)?;
    std::fs::write(&path, json)?;
    debug!(path = %path.display(), "results exported");
    Ok(path)
}

/// Headline figures shown on the results screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsSummary {
    /// Participant identifier
    pub participant_id: String,
    /// Order the conditions were shown in
    pub condition_order: ConditionOrder,
    /// Mean transparent-condition score (0 when absent)
    pub transparent_average: f64,
    /// Mean opaque-condition score (0 when absent)
    pub opaque_average: f64,
    /// Comparison answers
    pub final_preference: Option<FinalAnswers>,
}

impl ResultsSummary {
    /// Summarizes a record.
    #[must_use]
    pub fn from_record(record: &ResultsRecord) -> Self {
        let average = |condition: Condition| {
            record
                .scores(condition)
                .map_or(0.0, SurveyAnswers::average)
        };
        Self {
            participant_id: record.participant_id().to_string(),
            condition_order: record.condition_order(),
            transparent_average: average(Condition::Transparent),
            opaque_average: average(Condition::Opaque),
            final_preference: record.final_preference().copied(),
        }
    }

    /// Average for one condition.
    #[must_use]
    pub const fn average(&self, condition: Condition) -> f64 {
        match condition {
            Condition::Transparent => self.transparent_average,
            Condition::Opaque => self.opaque_average,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::randomization::SessionSeed;
    use crate::record::tests::SteppingClock;
    use crate::record::{Accumulator, RecordEvent};
    use crate::study::{LikertScore, QuestionSet};

    fn accumulator() -> Accumulator {
        Accumulator::new(
            &SessionSeed::fixed("abc-123", ConditionOrder::OPAQUE_FIRST),
            QuestionSet::default(),
            Arc::new(SteppingClock::new()),
        )
    }

    #[test]
    fn file_name_pattern() {
        assert_eq!(file_name("abc-123"), "study-results-abc-123.json");
    }

    #[test]
    fn export_is_idempotent() {
        let record = accumulator().snapshot();
        assert_eq!(
            to_pretty_json(&record).unwrap(),
            to_pretty_json(&record).unwrap()
        );
    }

    #[test]
    fn export_is_pretty_printed() {
        let json = to_pretty_json(&accumulator().snapshot()).unwrap();
        assert!(json.starts_with("{\n  \"participantId\": \"abc-123\""));
        assert!(json.contains("\"conditionOrder\": [\n    \"opaque\",\n    \"transparent\"\n  ]"));
    }

    #[test]
    fn write_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("nested");
        let record = accumulator().snapshot();
        let path = write_to_dir(&record, &nested).unwrap();
        assert_eq!(path, nested.join("study-results-abc-123.json"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, to_pretty_json(&record).unwrap());
    }

    #[test]
    fn summary_averages_present_scores() {
        let mut acc = accumulator();
        let scores = QuestionSet::default()
            .opaque
            .into_iter()
            .zip([2u8, 3, 4])
            .map(|(q, v)| (q, LikertScore::try_from(v).unwrap()))
            .collect();
        acc.record(RecordEvent::SurveyScores {
            condition: Condition::Opaque,
            answers: SurveyAnswers::new(scores, ""),
        })
        .unwrap();

        let summary = ResultsSummary::from_record(&acc.snapshot());
        assert!((summary.opaque_average - 3.0).abs() < f64::EPSILON);
        assert!(summary.transparent_average.abs() < f64::EPSILON);
        assert!(summary.final_preference.is_none());
        assert!((summary.average(Condition::Opaque) - 3.0).abs() < f64::EPSILON);
    }
}
