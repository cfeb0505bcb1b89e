//! Conversation turns and history helpers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a speaker in a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// End-user message
    User,
    /// Coach/assistant message
    Assistant,
    /// System message (instructions)
    System,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
            TurnRole::System => "system",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single turn in a chat history
///
/// History is an ordered, append-only sequence scoped to one persona. Only a
/// bounded window of recent turns is ever sent to the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Stable message id
    pub id: Uuid,
    /// Role of the speaker
    pub role: TurnRole,
    /// Content of the turn
    pub content: String,
    /// When the turn occurred
    pub timestamp: DateTime<Utc>,
    /// Skill this turn referenced, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_id: Option<String>,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            skill_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(TurnRole::System, content)
    }

    pub fn with_skill(mut self, skill_id: impl Into<String>) -> Self {
        self.skill_id = Some(skill_id.into());
        self
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Return the most recent `window` non-system turns, oldest first.
///
/// System turns never travel with history; they are rebuilt fresh for every
/// request so the prompt can never drift from session state.
pub fn recent_window(turns: &[Turn], window: usize) -> Vec<&Turn> {
    let mut recent: Vec<&Turn> = turns
        .iter()
        .rev()
        .filter(|t| t.role != TurnRole::System)
        .take(window)
        .collect();
    recent.reverse();
    recent
}
