//! Core types for the coaching response engine
//!
//! This crate provides the foundational value types used across all other
//! crates:
//! - Conversation turns and roles
//! - Skill catalog entries (curriculum-verbatim content)
//! - Coach personas
//! - Coaching session state (the guided-practice state machine)
//! - Response and side-channel metadata types

pub mod conversation;
pub mod persona;
pub mod response;
pub mod session;
pub mod skill;

pub use conversation::{Turn, TurnRole};
pub use persona::Persona;
pub use response::{
    Action, CoachResponse, DistressLevel, EscalationReason, ResponseSource,
    SkillSuggestion,
};
pub use session::{CoachingSession, CoachingUpdate};
pub use skill::{CurriculumModule, Skill, WellbeingDomain};
