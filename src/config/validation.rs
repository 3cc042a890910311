//! Study configuration validation.
//!
//! Runs on the fully deserialized `StudyConfig` and collects every issue
//! rather than stopping at the first.

use std::collections::HashSet;

use crate::analysis::{PolicyDocument, PolicySegment};
use crate::config::schema::StudyConfig;
use crate::error::{Severity, ValidationIssue};
use crate::study::Condition;

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Promotes every warning to an error.
    pub fn promote_warnings(&mut self) {
        for mut issue in self.warnings.drain(..) {
            issue.severity = Severity::Error;
            self.errors.push(issue);
        }
    }
}

/// Study configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every issue found.
    pub fn validate(&mut self, config: &StudyConfig) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_questions(config);
        self.validate_comparison(config);
        self.validate_documents(&config.documents);
        self.validate_analyses(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Surveys
    // ========================================================================

    fn validate_questions(&mut self, config: &StudyConfig) {
        for condition in Condition::ALL {
            let base = format!("questions.{}", condition.as_str());
            let questions = config.questions.for_condition(condition);
            if questions.is_empty() {
                self.add_error(&base, "condition has no survey questions");
                continue;
            }
            let mut seen = HashSet::new();
            for (i, question) in questions.iter().enumerate() {
                let path = format!("{base}[{i}]");
                if question.trim().is_empty() {
                    self.add_error(&path, "question text is empty");
                } else if !seen.insert(question.as_str()) {
                    self.add_error(&path, &format!("duplicate question '{question}'"));
                }
            }
        }
    }

    fn validate_comparison(&mut self, config: &StudyConfig) {
        let prompts = [
            ("comparison.preferred", &config.comparison.preferred),
            ("comparison.trustworthy", &config.comparison.trustworthy),
            ("comparison.reasoning", &config.comparison.reasoning),
        ];
        for (path, prompt) in prompts {
            if prompt.trim().is_empty() {
                self.add_error(path, "comparison prompt is empty");
            }
        }
    }

    // ========================================================================
    // Documents
    // ========================================================================

    fn validate_documents(&mut self, documents: &[PolicyDocument]) {
        if documents.is_empty() {
            self.add_error("documents", "at least one policy document is required");
            return;
        }

        let mut ids = HashSet::new();
        for (i, document) in documents.iter().enumerate() {
            let base = format!("documents[{i}]");
            if document.id.trim().is_empty() {
                self.add_error(&format!("{base}.id"), "document id is empty");
            } else if !ids.insert(document.id.as_str()) {
                self.add_warning(
                    &format!("{base}.id"),
                    &format!("duplicate document id '{}'", document.id),
                );
            }
            if document.title.trim().is_empty() {
                self.add_warning(&format!("{base}.title"), "document title is empty");
            }
            self.validate_segments(&base, document);
        }
    }

    fn validate_segments(&mut self, base: &str, document: &PolicyDocument) {
        let mut clause_ids = HashSet::new();
        for (i, segment) in document.segments.iter().enumerate() {
            let path = format!("{base}.segments[{i}]");
            if segment.content().trim().is_empty() {
                self.add_error(&path, "segment content is empty");
            }
            if let PolicySegment::Clause { id, .. } = segment {
                if !clause_ids.insert(*id) {
                    self.add_error(&format!("{path}.id"), &format!("duplicate clause id {id}"));
                }
            }
        }
        if clause_ids.is_empty() {
            self.add_error(
                &format!("{base}.segments"),
                "document has no clauses to analyze",
            );
        }
    }

    // ========================================================================
    // Canned analyses
    // ========================================================================

    fn validate_analyses(&mut self, config: &StudyConfig) {
        for (document_id, report) in &config.analyses {
            let base = format!("analyses.{document_id}");
            let Some(document) = config.document(document_id) else {
                self.add_warning(&base, "analysis for a document that is not configured");
                continue;
            };
            let known: HashSet<u32> = document.clause_ids().collect();
            for (i, clause) in report.analysis.iter().enumerate() {
                if !known.contains(&clause.id) {
                    self.add_warning(
                        &format!("{base}.analysis[{i}].id"),
                        &format!("clause {} does not exist in '{document_id}'", clause.id),
                    );
                }
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Adds an error to the collection.
    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    /// Adds a warning to the collection.
    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}
