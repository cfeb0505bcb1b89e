//! Message types and history shaping for LLM requests

use serde::{Deserialize, Serialize};

use coach_core::{conversation, Turn, TurnRole};

/// Message role in the provider wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl From<TurnRole> for Role {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::System => Role::System,
            TurnRole::User => Role::User,
            TurnRole::Assistant => Role::Assistant,
        }
    }
}

/// One message in the provider request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.into(),
            content: turn.content.clone(),
        }
    }
}

/// Build the message array for one request: system prompt first, then the
/// bounded recent history, then the current user turn.
pub fn build_messages(
    system_prompt: &str,
    history: &[Turn],
    user_turn: &str,
    window: usize,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(window + 2);
    messages.push(Message::system(system_prompt));
    messages.extend(
        conversation::recent_window(history, window)
            .into_iter()
            .map(Message::from),
    );
    messages.push(Message::user(user_turn));
    messages
}

/// Rough token estimate for budget checks, ~4 characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    use unicode_segmentation::UnicodeSegmentation;

    let graphemes = text.graphemes(true).count();
    graphemes.max(1) / 4
}
