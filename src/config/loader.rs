//! Study configuration loader.
//!
//! Pipeline:
//! 1. Size check and read
//! 2. YAML parsing
//! 3. Deserialization to `StudyConfig`
//! 4. Validation (warnings become errors in strict mode)
//! 5. Freeze with `Arc`

use std::path::Path;
use std::sync::Arc;

use serde_yaml::Value;
use tracing::debug;

use crate::config::schema::StudyConfig;
use crate::config::validation::Validator;
use crate::error::{ConfigError, ValidationIssue};

// ============================================================================
// Public API
// ============================================================================

/// Options for the configuration loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Treat validation warnings as errors.
    pub strict: bool,

    /// Maximum configuration file size in bytes.
    pub max_config_size: usize,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_config_size: env_or("CLEARSIGHT_MAX_STUDY_SIZE", 1024 * 1024),
        }
    }
}

/// Result of loading a study configuration.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<StudyConfig>,

    /// Validation warnings that did not prevent loading.
    pub warnings: Vec<ValidationIssue>,
}

/// Study configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Loads, validates and freezes a study configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or is too large
    /// - YAML parsing or deserialization fails
    /// - Validation finds errors
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let file_size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if file_size > self.options.max_config_size {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{file_size} bytes"),
                expected: format!("at most {} bytes", self.options.max_config_size),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        self.load_str(&raw, path)
    }

    /// Parses and validates configuration text; `origin` is used in errors.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing, deserialization, or validation fails.
    pub fn load_str(&self, raw: &str, origin: &Path) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let root: Value = serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
            path: origin.to_path_buf(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })?;

        if root.is_null() {
            return Err(ConfigError::ParseError {
                path: origin.to_path_buf(),
                line: None,
                message: "Configuration file is empty".to_string(),
            });
        }

        let config: StudyConfig =
            serde_yaml::from_value(root).map_err(|e| ConfigError::ParseError {
                path: origin.to_path_buf(),
                line: None,
                message: format!("Failed to deserialize study configuration: {e}"),
            })?;

        let mut result = Validator::new().validate(&config);
        if self.options.strict {
            result.promote_warnings();
        }
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: origin.display().to_string(),
                errors: result.errors,
            });
        }

        debug!(
            path = %origin.display(),
            documents = config.documents.len(),
            warnings = result.warnings.len(),
            "study configuration loaded"
        );

        Ok(LoadResult {
            config: Arc::new(config),
            warnings: result.warnings,
        })
    }
}

/// Reads an environment variable, falling back to `default` when unset
/// or unparsable.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const STUDY: &str = r"
questions:
  transparent: [Clear?, Useful?]
  opaque: [Clear?]
document_selection: random
documents:
  - id: tiny
    title: Tiny Policy
    segments:
      - type: heading
        content: Data
      - type: clause
        id: 1
        content: We sell everything.
analyses:
  tiny:
    analysis:
      - id: 1
        type: concerning
        explanation: Selling data is a risk.
    conclusion:
      recommendation: disagree
      summary: One risky clause.
      final_verdict: Do not agree.
";

    #[test]
    fn loads_custom_study() {
        let file = write_temp(STUDY);
        let result = ConfigLoader::default().load(file.path()).unwrap();
        let config = result.config;
        assert_eq!(config.questions.transparent, ["Clear?", "Useful?"]);
        assert_eq!(config.documents.len(), 1);
        assert!(config.has_canned_analysis("tiny"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn missing_file() {
        let err = ConfigLoader::default()
            .load(Path::new("/nonexistent/study.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn empty_file_is_parse_error() {
        let file = write_temp("");
        let err = ConfigLoader::default().load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn syntax_error_reports_line() {
        let file = write_temp("questions:\n  transparent: [a\n  opaque: b: c\n");
        let err = ConfigLoader::default().load(file.path()).unwrap_err();
        let ConfigError::ParseError { line, .. } = err else {
            panic!("expected parse error");
        };
        assert!(line.is_some());
    }

    #[test]
    fn validation_errors_fail_loading() {
        let file = write_temp("questions:\n  transparent: []\n  opaque: [Clear?]\n");
        let err = ConfigLoader::default().load(file.path()).unwrap_err();
        let ConfigError::ValidationError { errors, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors[0].path, "questions.transparent");
    }

    #[test]
    fn strict_mode_rejects_warnings() {
        let text = STUDY.replace("title: Tiny Policy", "title: \"\"");
        let lenient = ConfigLoader::default()
            .load_str(&text, Path::new("study.yaml"))
            .unwrap();
        assert_eq!(lenient.warnings.len(), 1);

        let strict = ConfigLoader::new(LoaderOptions {
            strict: true,
            ..LoaderOptions::default()
        });
        assert!(matches!(
            strict.load_str(&text, Path::new("study.yaml")),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let file = write_temp(STUDY);
        let loader = ConfigLoader::new(LoaderOptions {
            strict: false,
            max_config_size: 16,
        });
        assert!(matches!(
            loader.load(file.path()),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn bom_is_ignored() {
        let text = format!("\u{feff}{STUDY}");
        assert!(
            ConfigLoader::default()
                .load_str(&text, Path::new("bom.yaml"))
                .is_ok()
        );
    }
}
