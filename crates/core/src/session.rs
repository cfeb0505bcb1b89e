//! Guided-practice session state machine
//!
//! A coaching session walks the user through one skill's steps in order.
//! The session is a plain value owned by the caller and passed into the
//! engine each turn; the engine never holds session state itself. Step
//! numbers are 1-indexed and always clamped to `[1, total_steps]`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session state for one persona's conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CoachingSession {
    /// No walkthrough in progress
    #[default]
    Inactive,
    /// Walkthrough of `skill_id`, currently on `current_step`
    Active {
        skill_id: String,
        current_step: u32,
        total_steps: u32,
        started_at: DateTime<Utc>,
        /// User input collected per step, keyed by step number
        #[serde(default)]
        step_notes: BTreeMap<u32, String>,
    },
}

impl CoachingSession {
    /// Begin a walkthrough at step 1.
    pub fn start(skill_id: impl Into<String>, total_steps: u32) -> Self {
        CoachingSession::Active {
            skill_id: skill_id.into(),
            current_step: 1,
            total_steps: total_steps.max(1),
            started_at: Utc::now(),
            step_notes: BTreeMap::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, CoachingSession::Active { .. })
    }

    pub fn skill_id(&self) -> Option<&str> {
        match self {
            CoachingSession::Active { skill_id, .. } => Some(skill_id),
            CoachingSession::Inactive => None,
        }
    }

    pub fn current_step(&self) -> Option<u32> {
        match self {
            CoachingSession::Active { current_step, .. } => Some(*current_step),
            CoachingSession::Inactive => None,
        }
    }

    pub fn total_steps(&self) -> Option<u32> {
        match self {
            CoachingSession::Active { total_steps, .. } => Some(*total_steps),
            CoachingSession::Inactive => None,
        }
    }

    /// Advance to the next step, saturating at the last step.
    pub fn advance(&mut self) {
        if let CoachingSession::Active {
            current_step,
            total_steps,
            ..
        } = self
        {
            *current_step = (*current_step + 1).min(*total_steps);
        }
    }

    /// Jump to an explicit step number, clamped into `[1, total_steps]`.
    pub fn jump(&mut self, step: u32) {
        if let CoachingSession::Active {
            current_step,
            total_steps,
            ..
        } = self
        {
            *current_step = step.clamp(1, *total_steps);
        }
    }

    /// End the walkthrough. Also the correct transition on persona change.
    pub fn end(&mut self) {
        *self = CoachingSession::Inactive;
    }

    /// Record the user's input for the step it answered.
    pub fn record_note(&mut self, step: u32, note: impl Into<String>) {
        if let CoachingSession::Active { step_notes, .. } = self {
            step_notes.insert(step, note.into());
        }
    }

    /// Apply a step-navigation update produced by the engine.
    pub fn apply(&mut self, update: &CoachingUpdate) {
        if update.end {
            self.end();
        } else if let Some(step) = update.next_step {
            self.jump(step);
        }
    }
}

/// Step-navigation metadata returned with an engine response.
///
/// The engine never mutates the caller's session directly; it reports the
/// transition here and the caller applies it, so the session object and the
/// next prompt can never diverge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachingUpdate {
    /// Absolute step to move to, already clamped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step: Option<u32>,
    /// Whether the session should end
    #[serde(default)]
    pub end: bool,
}

impl CoachingUpdate {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn to_step(step: u32) -> Self {
        Self {
            next_step: Some(step),
            end: false,
        }
    }

    pub fn ended() -> Self {
        Self {
            next_step: None,
            end: true,
        }
    }

    pub fn is_none(&self) -> bool {
        self.next_step.is_none() && !self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_saturates_at_last_step() {
        let mut session = CoachingSession::start("mindfulness", 3);
        session.advance();
        session.advance();
        assert_eq!(session.current_step(), Some(3));
        session.advance();
        assert_eq!(session.current_step(), Some(3));
    }

    #[test]
    fn test_jump_clamps_both_ends() {
        let mut session = CoachingSession::start("reframe", 5);
        session.jump(0);
        assert_eq!(session.current_step(), Some(1));
        session.jump(6);
        assert_eq!(session.current_step(), Some(5));
        session.jump(4);
        assert_eq!(session.current_step(), Some(4));
    }

    #[test]
    fn test_repeated_advance_never_exceeds_total() {
        let total = 7;
        let mut session = CoachingSession::start("foundations-resilience", total);
        for _ in 0..(total - 1) {
            session.advance();
        }
        assert_eq!(session.current_step(), Some(total));
        session.advance();
        assert_eq!(session.current_step(), Some(total));
    }

    #[test]
    fn test_end_transitions_to_inactive() {
        let mut session = CoachingSession::start("mindfulness", 3);
        session.end();
        assert!(!session.is_active());
        assert_eq!(session.skill_id(), None);
    }

    #[test]
    fn test_apply_update() {
        let mut session = CoachingSession::start("mindfulness", 3);
        session.apply(&CoachingUpdate::to_step(2));
        assert_eq!(session.current_step(), Some(2));

        session.apply(&CoachingUpdate::none());
        assert_eq!(session.current_step(), Some(2));

        session.apply(&CoachingUpdate::ended());
        assert!(!session.is_active());
    }

    #[test]
    fn test_notes_keyed_by_step() {
        let mut session = CoachingSession::start("reframe", 4);
        session.record_note(1, "my activating event");
        session.advance();
        session.record_note(2, "my first thought");
        if let CoachingSession::Active { step_notes, .. } = &session {
            assert_eq!(step_notes.len(), 2);
            assert_eq!(step_notes[&1], "my activating event");
        } else {
            panic!("session should be active");
        }
    }
}
