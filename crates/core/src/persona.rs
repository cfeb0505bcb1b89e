//! Coach personas
//!
//! A persona fixes the voice of every non-verbatim sentence the engine
//! produces. Verbatim curriculum text (goal, when-to-use, steps, benefits)
//! is never re-voiced; personas only own the framing around it.

use serde::{Deserialize, Serialize};

/// A coach persona loaded from the roster configuration.
///
/// Template fields may contain a `{title}` placeholder which is substituted
/// with the skill title at composition time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Stable slug, unique within the roster
    pub id: String,
    /// Name shown to the user
    pub display_name: String,
    /// Free-text voice description, fed to the style checklist and the
    /// LLM system prompt
    pub voice: String,
    /// Skill ids featured in this persona's roster profile. Display
    /// metadata for clients; ranking does not read it.
    #[serde(default)]
    pub specialties: Vec<String>,
    /// Extra textual constraints appended to the prompt guardrail section
    #[serde(default)]
    pub guardrails: Vec<String>,
    /// One-line scripted-response opener, templated on `{title}`
    pub intro_line: String,
    /// Short encouragement appended to coaching step prompts
    pub encouragement: String,
    /// Greeting used when a conversation starts
    pub welcome: String,
    /// Closing sentence for the static fallback reply
    pub fallback_tail: String,
}

impl Persona {
    /// Render the scripted-response intro for a skill title.
    pub fn intro_for(&self, title: &str) -> String {
        self.intro_line.replace("{title}", title)
    }

    /// Synthesized default persona, used when resolution finds no roster
    /// match. Professional and neutral so it is safe for any input.
    pub fn generic() -> Self {
        Self {
            id: "coach".to_string(),
            display_name: "Coach".to_string(),
            voice: "professional, supportive, and clear".to_string(),
            specialties: Vec::new(),
            guardrails: Vec::new(),
            intro_line: "Let's walk through {title} together.".to_string(),
            encouragement: "Take your time with this step.".to_string(),
            welcome: "Hi, I'm your resilience coach. What's on your mind today?"
                .to_string(),
            fallback_tail: "I'm here whenever you want to keep going."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intro_template_substitution() {
        let persona = Persona::generic();
        let intro = persona.intro_for("Mindfulness");
        assert!(intro.contains("Mindfulness"));
        assert!(!intro.contains("{title}"));
    }

    #[test]
    fn test_generic_persona_is_complete() {
        let persona = Persona::generic();
        assert!(!persona.voice.is_empty());
        assert!(!persona.welcome.is_empty());
        assert!(!persona.fallback_tail.is_empty());
    }
}
