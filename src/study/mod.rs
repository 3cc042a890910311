//! Study data model
//!
//! Conditions, survey payloads, and the content participants see.

pub mod answers;
pub mod condition;
pub mod content;

pub use answers::{
    FinalAnswers, LikertScore, Preference, ReasoningPreference, SurveyAnswers, suggest_question,
};
pub use condition::{Condition, ConditionOrder, Slot};
pub use content::{ComparisonPrompts, QuestionSet};
