//! Study configuration validation command.

use std::path::Path;

use serde_json::{Value, json};

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoaderOptions};
use crate::error::{ConfigError, StudyError, ValidationIssue};

/// Validates every file, reporting each before failing.
///
/// # Errors
///
/// Returns the first file's configuration error once all files have
/// been checked.
pub fn run(args: &ValidateArgs) -> Result<(), StudyError> {
    let loader = ConfigLoader::new(LoaderOptions {
        strict: args.strict,
        ..LoaderOptions::default()
    });

    let mut first_error = None;
    let mut reports = Vec::with_capacity(args.files.len());
    for path in &args.files {
        tracing::info!(file = %path.display(), "validating study configuration");
        let report = match loader.load(path) {
            Ok(result) => FileReport {
                path,
                error: None,
                issues: result.warnings,
            },
            Err(err) => {
                let issues = match &err {
                    ConfigError::ValidationError { errors, .. } => errors.clone(),
                    _ => Vec::new(),
                };
                let report = FileReport {
                    path,
                    error: Some(err.to_string()),
                    issues,
                };
                first_error.get_or_insert(err);
                report
            }
        };
        reports.push(report);
    }

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                println!("{}", report.human());
            }
        }
        OutputFormat::Json => {
            let files: Vec<Value> = reports.iter().map(FileReport::json).collect();
            println!("{}", json!({ "files": files }));
        }
    }

    first_error.map_or(Ok(()), |err| Err(err.into()))
}

struct FileReport<'a> {
    path: &'a Path,
    error: Option<String>,
    issues: Vec<ValidationIssue>,
}

impl FileReport<'_> {
    fn human(&self) -> String {
        let mut out = match &self.error {
            None => format!("{}: valid", self.path.display()),
            Some(err) => format!("{}: {err}", self.path.display()),
        };
        for issue in &self.issues {
            out.push_str("\n  ");
            out.push_str(&issue.to_string());
        }
        out
    }

    fn json(&self) -> Value {
        let issues: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        json!({
            "file": self.path.display().to_string(),
            "valid": self.error.is_none(),
            "error": self.error,
            "issues": issues,
        })
    }
}
