//! CLI argument definitions
//!
//! All Clap derive structs for `clearsight` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::analysis::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::observability::{ColorChoice, LogFormat};

// ============================================================================
// Root CLI
// ============================================================================

/// Counterbalanced AI-transparency study sessions.
#[derive(Parser, Debug)]
#[command(name = "clearsight", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "CLEARSIGHT_COLOR")]
    pub color: ColorChoice,

    /// Log line format.
    #[arg(long, default_value = "human", global = true, env = "CLEARSIGHT_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one participant session.
    Run(RunArgs),

    /// Print the active study content.
    Content(ContentArgs),

    /// Validate study configuration files.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Run
// ============================================================================

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Study configuration file (built-in study when omitted).
    #[arg(short, long, env = "CLEARSIGHT_STUDY")]
    pub study: Option<PathBuf>,

    /// Treat study validation warnings as errors.
    #[arg(long)]
    pub strict: bool,

    /// Policy analysis backend.
    #[arg(long, default_value = "canned", env = "CLEARSIGHT_ANALYZER")]
    pub analyzer: AnalyzerKind,

    /// Gemini model name.
    #[arg(long, default_value = DEFAULT_MODEL, env = "CLEARSIGHT_GEMINI_MODEL")]
    pub gemini_model: String,

    /// Gemini API base URL.
    #[arg(long, default_value = DEFAULT_ENDPOINT, env = "CLEARSIGHT_GEMINI_ENDPOINT")]
    pub gemini_endpoint: String,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Directory receiving the results export.
    #[arg(short, long, default_value = ".", env = "CLEARSIGHT_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Deterministic session seed (participant id, order, document).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Replay answers from a YAML/JSON responses file instead of prompting.
    #[arg(short, long)]
    pub responses: Option<PathBuf>,

    /// Write JSONL session events to this file.
    #[arg(long, env = "CLEARSIGHT_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,
}

// ============================================================================
// Content / Validate
// ============================================================================

/// Arguments for `content`.
#[derive(Args, Debug)]
pub struct ContentArgs {
    /// Study configuration file (built-in study when omitted).
    #[arg(short, long, env = "CLEARSIGHT_STUDY")]
    pub study: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Study configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Enable strict validation (warnings become errors).
    #[arg(long)]
    pub strict: bool,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Policy analysis backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AnalyzerKind {
    /// Offline analyses shipped with the study content.
    #[default]
    Canned,
    /// Live Gemini structured-output analysis.
    Gemini,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
