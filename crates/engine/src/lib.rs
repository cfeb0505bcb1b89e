//! Coaching response engine
//!
//! The pipeline between a user utterance and the reply: safety triage,
//! skill mention detection, suggestion ranking, persona style synthesis,
//! the coaching step walkthrough, and final response composition. Session
//! state is a value owned by the caller; the engine reports transitions
//! and never mutates caller state.

pub mod composer;
pub mod mention;
pub mod store;
pub mod style;
pub mod suggest;
pub mod triage;

pub use composer::{CoachEngine, EngineOptions, TurnRequest};
pub use mention::MentionDetector;
pub use store::{MemorySessionStore, SessionStore};
pub use style::PromptSynthesizer;
pub use suggest::SuggestionRanker;
pub use triage::{SafetyTriage, TriageOutcome};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Session store error: {0}")]
    Store(String),
}
