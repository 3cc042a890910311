//! Offline analyzer serving pre-written reports.

use std::collections::HashMap;

use tracing::debug;

use super::{AnalysisReport, PolicyAnalyzer, PolicyDocument, Result};
use crate::error::AnalysisError;
use crate::study::content::{BUILTIN_DOCUMENT_ID, builtin_report};

/// Serves a fixed report per document id.
#[derive(Debug, Clone, Default)]
pub struct CannedAnalyzer {
    reports: HashMap<String, AnalysisReport>,
}

impl CannedAnalyzer {
    /// Analyzer with no reports.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzer preloaded with the report for the built-in policy.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new().with_report(BUILTIN_DOCUMENT_ID, builtin_report())
    }

    /// Adds (or replaces) the report served for `document_id`.
    #[must_use]
    pub fn with_report(mut self, document_id: impl Into<String>, report: AnalysisReport) -> Self {
        self.reports.insert(document_id.into(), report);
        self
    }
}

#[async_trait::async_trait]
impl PolicyAnalyzer for CannedAnalyzer {
    async fn analyze(&self, document: &PolicyDocument) -> Result<AnalysisReport> {
        debug!(document = %document.id, "serving canned analysis");
        self.reports
            .get(&document.id)
            .cloned()
            .ok_or_else(|| AnalysisError::Unavailable {
                document: document.id.clone(),
            })
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::study::content::builtin_document;

    #[tokio::test]
    async fn serves_builtin_report() {
        let analyzer = CannedAnalyzer::builtin();
        let report = analyzer.analyze(&builtin_document()).await.unwrap();
        assert_eq!(report, builtin_report());
    }

    #[tokio::test]
    async fn unknown_document_is_unavailable() {
        let analyzer = CannedAnalyzer::builtin();
        let mut doc = builtin_document();
        doc.id = "other".into();
        let err = analyzer.analyze(&doc).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Unavailable { document } if document == "other"));
    }
}
