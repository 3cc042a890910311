//! Error types for `clearsight`
//!
//! One `thiserror` enum per concern, aggregated by [`StudyError`], which
//! also maps every failure onto a process exit code.

use std::path::PathBuf;
use thiserror::Error;

use crate::phase::Phase;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `clearsight` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied, input closed)
    pub const IO_ERROR: i32 = 3;

    /// Session error (rejected completion, accumulator violation, entropy)
    pub const SESSION_ERROR: i32 = 5;

    /// Analysis collaborator error
    pub const ANALYSIS_ERROR: i32 = 6;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `clearsight` operations.
#[derive(Debug, Error)]
pub enum StudyError {
    /// Study configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Phase state machine rejected a completion
    #[error(transparent)]
    Phase(#[from] PhaseError),

    /// Results accumulator rejected a write
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Incomplete or invalid participant input
    #[error(transparent)]
    Input(#[from] InputError),

    /// Analysis collaborator failure
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Screen (front-end) failure
    #[error(transparent)]
    Screen(#[from] ScreenError),

    /// Session could not be seeded
    #[error(transparent)]
    Entropy(#[from] EntropyError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl StudyError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Phase(_) | Self::Record(_) | Self::Entropy(_) => ExitCode::SESSION_ERROR,
            Self::Analysis(_) | Self::Screen(ScreenError::Analysis(_)) => ExitCode::ANALYSIS_ERROR,
            Self::Io(_) | Self::Screen(ScreenError::Io(_) | ScreenError::InputClosed) => {
                ExitCode::IO_ERROR
            }
            Self::Input(_) | Self::Json(_) | Self::Screen(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Study configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}")]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "documents[0].segments[3].id")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Prevents the configuration from being used
    Error,
    /// Reported, but the configuration still loads
    Warning,
}

// ============================================================================
// Session Errors
// ============================================================================

/// Phase state machine errors.
///
/// The session and results record are unchanged whenever one of these
/// is returned.
#[derive(Debug, Error)]
pub enum PhaseError {
    /// A completion arrived that does not belong to the current phase
    #[error("unexpected {completion} completion during {phase} phase")]
    UnexpectedCompletion {
        /// Phase the session was in
        phase: Phase,
        /// Kind of completion that was delivered
        completion: &'static str,
    },

    /// A completion arrived after the session reached its results phase
    #[error("session already complete")]
    SessionComplete,

    /// The accumulator refused the completion's payload
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Results accumulator errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// An answer-bearing field was written twice
    #[error("field '{field}' has already been recorded")]
    AlreadyRecorded {
        /// Export name of the field
        field: &'static str,
    },

    /// Payload does not satisfy the field's schema
    #[error("malformed payload: {reason}")]
    MalformedPayload {
        /// What was wrong with the payload
        reason: String,
    },
}

/// Incomplete or invalid participant input, caught at the screen boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    /// The participant has not consented
    #[error("consent is required to start the study")]
    ConsentRequired,

    /// A survey question has no score
    #[error("missing score for question '{question}'")]
    MissingScore {
        /// Question text
        question: String,
    },

    /// A score was given for a question outside the active question set
    #[error("unknown question '{question}'{}", .suggestion.as_ref().map_or_else(String::new, |s| format!(" (did you mean '{s}'?)")))]
    UnknownQuestion {
        /// Question text as given
        question: String,
        /// Closest known question, if any is close enough
        suggestion: Option<String>,
    },

    /// Likert score outside 1..=5
    #[error("score {value} is outside the 1-5 scale")]
    ScoreOutOfRange {
        /// Offending value
        value: i64,
    },

    /// A comparison field was left unset
    #[error("missing selection for '{field}'")]
    MissingSelection {
        /// Field name
        field: &'static str,
    },

    /// Continue was requested before the analysis was shown
    #[error("the analysis must complete before continuing")]
    AnalysisPending,

    /// Free-form input did not match any accepted choice
    #[error("'{input}' is not a valid choice (expected {expected})")]
    InvalidChoice {
        /// Raw input
        input: String,
        /// Description of accepted values
        expected: String,
    },
}

/// Analysis collaborator errors.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No API credential configured
    #[error("analysis credential not configured (set GEMINI_API_KEY)")]
    MissingCredential,

    /// Request could not be sent or the response could not be read
    #[error("analysis request failed: {0}")]
    Request(String),

    /// Remote service answered with a non-success status
    #[error("analysis service returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// Response did not match the analysis report contract
    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),

    /// The analyzer has nothing for this document
    #[error("no analysis available for document '{document}'")]
    Unavailable {
        /// Document identifier
        document: String,
    },
}

/// Screen (front-end collaborator) errors.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// Terminal I/O failure
    #[error("screen I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The participant's input stream ended mid-session
    #[error("input closed before the session finished")]
    InputClosed,

    /// Input rejected at the screen boundary
    #[error(transparent)]
    Input(#[from] InputError),

    /// Analysis failed and the screen cannot retry
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Scripted responses are missing or inconsistent
    #[error("responses script error: {reason}")]
    Script {
        /// What the script is missing
        reason: String,
    },
}

/// The entropy source could not produce a session seed.
#[derive(Debug, Error)]
#[error("entropy source unavailable: {0}")]
pub struct EntropyError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_variant() {
        let err = StudyError::Config(ConfigError::MissingFile {
            path: PathBuf::from("study.yaml"),
        });
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);

        let err = StudyError::Phase(PhaseError::SessionComplete);
        assert_eq!(err.exit_code(), ExitCode::SESSION_ERROR);

        let err = StudyError::Entropy(EntropyError("no device".into()));
        assert_eq!(err.exit_code(), ExitCode::SESSION_ERROR);

        let err = StudyError::Screen(ScreenError::InputClosed);
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);

        let err = StudyError::Screen(ScreenError::Analysis(AnalysisError::MissingCredential));
        assert_eq!(err.exit_code(), ExitCode::ANALYSIS_ERROR);

        let err = StudyError::Input(InputError::ConsentRequired);
        assert_eq!(err.exit_code(), ExitCode::ERROR);
    }

    #[test]
    fn unknown_question_display_with_suggestion() {
        let err = InputError::UnknownQuestion {
            question: "I trust this AIs reasoning.".into(),
            suggestion: Some("I trust this AI's reasoning.".into()),
        };
        assert_eq!(
            err.to_string(),
            "unknown question 'I trust this AIs reasoning.' (did you mean 'I trust this AI's reasoning.'?)"
        );
    }

    #[test]
    fn unknown_question_display_without_suggestion() {
        let err = InputError::UnknownQuestion {
            question: "zzz".into(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "unknown question 'zzz'");
    }

    #[test]
    fn validation_issue_display() {
        let issue = ValidationIssue {
            path: "questions.opaque".into(),
            message: "no questions defined".into(),
            severity: Severity::Error,
        };
        assert_eq!(
            issue.to_string(),
            "error: no questions defined at questions.opaque"
        );
    }

    #[test]
    fn phase_error_wraps_record_error() {
        let err = PhaseError::from(RecordError::AlreadyRecorded {
            field: "opaqueScores",
        });
        assert_eq!(
            err.to_string(),
            "field 'opaqueScores' has already been recorded"
        );
    }
}
