//! `clearsight` - counterbalanced AI-transparency study sessions
//!
//! A participant moves through an introduction, two condition views
//! (transparent and opaque AI analyses of the same privacy policy, in a
//! randomized order), a survey after each, a final comparison and a
//! results screen. Every answer is recorded once and exported as
//! `study-results-<participantId>.json`.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod observability;
pub mod phase;
pub mod randomization;
pub mod record;
pub mod runner;
pub mod screen;
pub mod study;
