//! Prints the active study content.

use std::fmt::Write as _;

use serde_json::json;

use crate::cli::args::{ContentArgs, OutputFormat};
use crate::config::StudyConfig;
use crate::error::StudyError;
use crate::study::Condition;
use crate::study::content::{CONSENT_STATEMENT, INTRODUCTION};

/// Print the study participants will see.
///
/// # Errors
///
/// Returns a configuration error if `--study` cannot be loaded.
pub fn run(args: &ContentArgs) -> Result<(), StudyError> {
    let study = super::load_study(args.study.as_deref(), false)?;
    match args.format {
        OutputFormat::Human => print!("{}", render_human(&study)),
        OutputFormat::Json => {
            let doc = json!({
                "introduction": INTRODUCTION,
                "consent": CONSENT_STATEMENT,
                "study": &*study,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

fn render_human(study: &StudyConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Introduction\n  {INTRODUCTION}\n");
    let _ = writeln!(out, "Consent\n  {CONSENT_STATEMENT}\n");
    for condition in Condition::ALL {
        let _ = writeln!(out, "{} survey", condition.label());
        for (i, question) in study.questions.for_condition(condition).iter().enumerate() {
            let _ = writeln!(out, "  {}. {question}", i + 1);
        }
        out.push('\n');
    }
    let _ = writeln!(out, "Comparison");
    for prompt in [
        &study.comparison.preferred,
        &study.comparison.trustworthy,
        &study.comparison.reasoning,
    ] {
        let _ = writeln!(out, "  - {prompt}");
    }
    let _ = writeln!(out, "\nDocuments ({:?} selection)", study.document_selection);
    for document in &study.documents {
        let canned = if study.has_canned_analysis(&document.id) {
            "canned analysis"
        } else {
            "live analysis only"
        };
        let _ = writeln!(
            out,
            "  {} \"{}\": {} clauses, {canned}",
            document.id,
            document.title,
            document.clause_ids().count()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_lists_questions_and_documents() {
        let text = render_human(&StudyConfig::default());
        assert!(text.contains("Transparent AI survey"));
        assert!(text.contains("  1. "));
        assert!(text.contains("synapse"));
        assert!(text.contains("canned analysis"));
    }
}
