//! Configuration module
//!
//! Loads and validates study content files: survey questions, comparison
//! prompts, policy documents and offline analyses.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLoader, LoadResult, LoaderOptions};
pub use schema::{DocumentSelection, StudyConfig};
pub use validation::{ValidationResult, Validator};
