//! Policy analysis collaborator contract.
//!
//! The analysis step is an external black box: given a policy broken
//! into labeled segments it returns one classification per clause plus
//! an overall recommendation. The state machine never calls it; the
//! condition-view screen does, and only reports completion once an
//! analysis has been shown.
//!
//! - [`PolicyAnalyzer`]: the async collaborator trait
//! - [`CannedAnalyzer`]: built-in reports, no network
//! - [`GeminiAnalyzer`]: remote structured-output model call

pub mod canned;
pub mod gemini;

pub use canned::CannedAnalyzer;
pub use gemini::GeminiAnalyzer;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// One labeled piece of a policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicySegment {
    /// Section heading.
    Heading {
        /// Heading text
        content: String,
    },
    /// Unanalyzed prose.
    Paragraph {
        /// Paragraph text
        content: String,
    },
    /// A clause the analyzer classifies.
    Clause {
        /// Clause identifier, unique within the document
        id: u32,
        /// Clause text
        content: String,
    },
}

impl PolicySegment {
    /// Segment text regardless of kind.
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::Heading { content } | Self::Paragraph { content } | Self::Clause { content, .. } => {
                content
            }
        }
    }

    /// Clause identifier, if this segment is a clause.
    #[must_use]
    pub const fn clause_id(&self) -> Option<u32> {
        match self {
            Self::Clause { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// A policy document shown during a condition visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// Stable identifier (used to key canned analyses).
    pub id: String,
    /// Display title.
    pub title: String,
    /// Ordered segments.
    pub segments: Vec<PolicySegment>,
}

impl PolicyDocument {
    /// Identifiers of every clause, in document order.
    pub fn clause_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.segments.iter().filter_map(PolicySegment::clause_id)
    }
}

/// Renders a document as analyzer input.
///
/// Clauses are prefixed with `[CLAUSE_ID=<n>]` so classifications can be
/// linked back to segments; segments are separated by a blank line.
#[must_use]
pub fn render_policy_text(document: &PolicyDocument) -> String {
    document
        .segments
        .iter()
        .map(|segment| match segment {
            PolicySegment::Clause { id, content } => format!("[CLAUSE_ID={id}] {content}"),
            other => other.content().to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Classification of a single clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseVerdict {
    /// Potential risk to the user
    Concerning,
    /// Protects or benefits the user
    Positive,
    /// Neither
    Neutral,
}

impl ClauseVerdict {
    /// Participant-facing flag text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Concerning => "Concerning Clause",
            Self::Positive => "Positive Clause",
            Self::Neutral => "Neutral Clause",
        }
    }
}

/// The analyzer's view of one clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseAnalysis {
    /// Clause identifier
    pub id: u32,
    /// Classification
    #[serde(rename = "type")]
    pub verdict: ClauseVerdict,
    /// Free-text rationale
    pub explanation: String,
}

/// Overall recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Accept the policy
    Agree,
    /// Do not accept the policy
    Disagree,
}

/// Overall conclusion of an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conclusion {
    /// Agree or disagree
    pub recommendation: Recommendation,
    /// Summary of the key findings
    pub summary: String,
    /// One-sentence verdict
    pub final_verdict: String,
}

/// Complete analyzer output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Per-clause classifications
    pub analysis: Vec<ClauseAnalysis>,
    /// Overall conclusion
    pub conclusion: Conclusion,
}

impl AnalysisReport {
    /// Parses a report from the JSON text an analyzer returned.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MalformedResponse`] when the text is not a
    /// report.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| AnalysisError::MalformedResponse(e.to_string()))
    }

    /// Classification for a clause, if the analyzer produced one.
    #[must_use]
    pub fn for_clause(&self, id: u32) -> Option<&ClauseAnalysis> {
        self.analysis.iter().find(|a| a.id == id)
    }

    /// Number of clauses with the given verdict.
    #[must_use]
    pub fn count(&self, verdict: ClauseVerdict) -> usize {
        self.analysis.iter().filter(|a| a.verdict == verdict).count()
    }
}

/// External analysis collaborator.
///
/// Implementations may fail; the calling screen surfaces the failure and
/// lets the participant retry without touching session state.
#[async_trait::async_trait]
pub trait PolicyAnalyzer: Send + Sync {
    /// Analyzes every clause of `document`.
    async fn analyze(&self, document: &PolicyDocument) -> Result<AnalysisReport>;

    /// Short name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> PolicyDocument {
        PolicyDocument {
            id: "d".into(),
            title: "Doc".into(),
            segments: vec![
                PolicySegment::Heading {
                    content: "Title".into(),
                },
                PolicySegment::Clause {
                    id: 1,
                    content: "We collect data.".into(),
                },
                PolicySegment::Paragraph {
                    content: "Note.".into(),
                },
                PolicySegment::Clause {
                    id: 2,
                    content: "We share data.".into(),
                },
            ],
        }
    }

    #[test]
    fn render_marks_clauses() {
        assert_eq!(
            render_policy_text(&doc()),
            "Title\n\n[CLAUSE_ID=1] We collect data.\n\nNote.\n\n[CLAUSE_ID=2] We share data."
        );
    }

    #[test]
    fn clause_ids_in_order() {
        assert_eq!(doc().clause_ids().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn segment_yaml_shape() {
        let yaml = "- type: clause\n  id: 4\n  content: x\n- type: heading\n  content: h\n";
        let segments: Vec<PolicySegment> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(segments[0].clause_id(), Some(4));
        assert_eq!(segments[1].content(), "h");
    }

    #[test]
    fn report_parses_wire_format() {
        let text = r#"{
            "analysis": [
                {"id": 1, "type": "concerning", "explanation": "broad"},
                {"id": 2, "type": "positive", "explanation": "fine"}
            ],
            "conclusion": {
                "recommendation": "disagree",
                "summary": "risky",
                "final_verdict": "Do not agree."
            }
        }"#;
        let report = AnalysisReport::from_json(text).unwrap();
        assert_eq!(report.for_clause(1).unwrap().verdict, ClauseVerdict::Concerning);
        assert_eq!(report.count(ClauseVerdict::Positive), 1);
        assert_eq!(report.conclusion.recommendation, Recommendation::Disagree);
    }

    #[test]
    fn report_rejects_unknown_verdict() {
        let text = r#"{"analysis":[{"id":1,"type":"scary","explanation":""}],
            "conclusion":{"recommendation":"agree","summary":"","final_verdict":""}}"#;
        assert!(matches!(
            AnalysisReport::from_json(text),
            Err(AnalysisError::MalformedResponse(_))
        ));
    }
}
