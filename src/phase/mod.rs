//! Phase state machine.
//!
//! A session walks `Introduction → Condition → Survey → Condition →
//! Survey → Comparison → Results`. The [`StudyEngine`] owns the session
//! and interprets every screen completion.

pub mod engine;
pub mod state;

pub use engine::StudyEngine;
pub use state::{Phase, PhaseTransition};
