//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod completions;
pub mod content;
pub mod run;
pub mod validate;
pub mod version;

use std::path::Path;
use std::sync::Arc;

use crate::cli::args::{Cli, Commands};
use crate::config::{ConfigLoader, LoaderOptions, StudyConfig};
use crate::error::StudyError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli) -> Result<(), StudyError> {
    match cli.command {
        Commands::Run(args) => run::run(&args).await,
        Commands::Content(args) => content::run(&args),
        Commands::Validate(args) => validate::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Loads the study at `path`, or the built-in study when absent.
///
/// Validation warnings are logged.
fn load_study(path: Option<&Path>, strict: bool) -> Result<Arc<StudyConfig>, StudyError> {
    let Some(path) = path else {
        return Ok(Arc::new(StudyConfig::default()));
    };
    tracing::info!(study = %path.display(), "loading study configuration");
    let loader = ConfigLoader::new(LoaderOptions {
        strict,
        ..LoaderOptions::default()
    });
    let result = loader.load(path)?;
    for warning in &result.warnings {
        tracing::warn!(path = %warning.path, "{}", warning.message);
    }
    Ok(result.config)
}
