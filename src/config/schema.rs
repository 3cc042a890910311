//! Study configuration schema.
//!
//! Every field defaults to the built-in study, so an empty mapping is a
//! complete configuration.

use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisReport, CannedAnalyzer, PolicyDocument};
use crate::study::content::{self, BIAS_DISCLOSURE, BUILTIN_DOCUMENT_ID};
use crate::study::{ComparisonPrompts, QuestionSet};

/// Study content: questions, prompts, documents and canned analyses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyConfig {
    /// Likert statements per condition
    #[serde(default)]
    pub questions: QuestionSet,

    /// Comparison prompts
    #[serde(default)]
    pub comparison: ComparisonPrompts,

    /// Candidate policy documents
    #[serde(default = "default_documents")]
    pub documents: Vec<PolicyDocument>,

    /// How a session picks its document
    #[serde(default)]
    pub document_selection: DocumentSelection,

    /// Disclosure shown with the transparent analysis
    #[serde(default = "default_bias_disclosure")]
    pub bias_disclosure: String,

    /// Offline analyses keyed by document id, added to the built-in one
    #[serde(default)]
    pub analyses: IndexMap<String, AnalysisReport>,
}

fn default_documents() -> Vec<PolicyDocument> {
    vec![content::builtin_document()]
}

fn default_bias_disclosure() -> String {
    BIAS_DISCLOSURE.to_string()
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            questions: QuestionSet::default(),
            comparison: ComparisonPrompts::default(),
            documents: default_documents(),
            document_selection: DocumentSelection::default(),
            bias_disclosure: default_bias_disclosure(),
            analyses: IndexMap::new(),
        }
    }
}

impl StudyConfig {
    /// Picks the session's document according to `document_selection`.
    ///
    /// Returns `None` only when no documents are configured.
    pub fn select_document<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&PolicyDocument> {
        self.document_selection.pick(&self.documents, rng)
    }

    /// Document by id.
    #[must_use]
    pub fn document(&self, id: &str) -> Option<&PolicyDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Offline analyzer serving the built-in report plus configured ones.
    #[must_use]
    pub fn canned_analyzer(&self) -> CannedAnalyzer {
        self.analyses
            .iter()
            .fold(CannedAnalyzer::builtin(), |analyzer, (id, report)| {
                analyzer.with_report(id.clone(), report.clone())
            })
    }

    /// Whether a canned analysis exists for the document.
    #[must_use]
    pub fn has_canned_analysis(&self, document_id: &str) -> bool {
        document_id == BUILTIN_DOCUMENT_ID || self.analyses.contains_key(document_id)
    }
}

/// Document selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSelection {
    /// Always the first document
    #[default]
    First,
    /// Uniformly at random per session
    Random,
}

impl DocumentSelection {
    /// Picks a document from `documents`.
    pub fn pick<'a, R: Rng + ?Sized>(
        self,
        documents: &'a [PolicyDocument],
        rng: &mut R,
    ) -> Option<&'a PolicyDocument> {
        if documents.is_empty() {
            return None;
        }
        match self {
            Self::First => documents.first(),
            Self::Random => documents.get(rng.random_range(0..documents.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::analysis::PolicySegment;

    fn doc(id: &str) -> PolicyDocument {
        PolicyDocument {
            id: id.into(),
            title: id.to_uppercase(),
            segments: vec![PolicySegment::Clause {
                id: 1,
                content: "We keep your data.".into(),
            }],
        }
    }

    #[test]
    fn empty_mapping_is_builtin_study() {
        let config: StudyConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, StudyConfig::default());
        assert_eq!(config.documents[0].id, BUILTIN_DOCUMENT_ID);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_yaml::from_str::<StudyConfig>("surveys: []").is_err());
    }

    #[test]
    fn first_selection_is_stable() {
        let docs = [doc("a"), doc("b")];
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            let picked = DocumentSelection::First.pick(&docs, &mut rng).unwrap();
            assert_eq!(picked.id, "a");
        }
    }

    #[test]
    fn random_selection_reaches_every_document() {
        let docs = [doc("a"), doc("b"), doc("c")];
        let mut rng = StdRng::seed_from_u64(7);
        let seen: std::collections::HashSet<_> = (0..200)
            .map(|_| DocumentSelection::Random.pick(&docs, &mut rng).unwrap().id.clone())
            .collect();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn no_documents_selects_nothing() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(DocumentSelection::Random.pick(&[], &mut rng).is_none());
    }

    #[test]
    fn builtin_document_has_canned_analysis() {
        let config = StudyConfig::default();
        assert!(config.has_canned_analysis(BUILTIN_DOCUMENT_ID));
        assert!(!config.has_canned_analysis("other"));
    }
}
