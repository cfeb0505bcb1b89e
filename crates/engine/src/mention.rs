//! Skill mention and navigation intent detection
//!
//! Three mention categories run in order and short-circuit on the first
//! category with any hits: exact title/id substring, sliding 3-word title
//! phrase, then curated keywords gated by context triggers (or a short
//! input). The gate keeps incidental keyword collisions in long free text
//! from hijacking the turn into skill delivery.

use once_cell::sync::Lazy;
use regex::Regex;

use coach_config::SkillCatalog;
use coach_core::{CoachingSession, CoachingUpdate};

/// Phrases that mark a keyword hit as an intentional skill question.
const CONTEXT_TRIGGERS: &[&str] = &[
    "what is",
    "tell me about",
    "explain",
    "describe",
    "skill",
    "about",
    "how to",
    "steps",
];

/// Inputs shorter than this are treated as direct questions.
const SHORT_INPUT_CHARS: usize = 50;

const NEXT_PHRASES: &[&str] = &["next", "continue", "move on", "proceed", "keep going"];

const END_PHRASES: &[&str] = &["done", "finished", "complete", "end session", "stop here"];

const ALTERNATIVE_PHRASES: &[&str] = &[
    "other skill",
    "another skill",
    "different skill",
    "something else",
    "what else",
    "alternative",
];

const AFFIRMATIVE_PHRASES: &[&str] = &[
    "yes",
    "sure",
    "okay",
    "let's try",
    "lets try",
    "let's do it",
    "walk me through",
    "sounds good",
];

static STEP_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bstep\s+(\d{1,3})\b").unwrap());

struct MentionEntry {
    id: String,
    title_lower: String,
    title_trigrams: Vec<String>,
    keywords: Vec<String>,
}

pub struct MentionDetector {
    entries: Vec<MentionEntry>,
}

impl MentionDetector {
    pub fn new(catalog: &SkillCatalog) -> Self {
        let entries = catalog
            .list()
            .iter()
            .map(|skill| {
                let title_lower = skill.title.to_lowercase();
                let words: Vec<&str> = title_lower.split_whitespace().collect();
                let title_trigrams = if words.len() >= 3 {
                    words.windows(3).map(|w| w.join(" ")).collect()
                } else {
                    Vec::new()
                };
                MentionEntry {
                    id: skill.id.clone(),
                    title_lower,
                    title_trigrams,
                    keywords: skill
                        .keywords
                        .iter()
                        .map(|k| k.to_lowercase())
                        .collect(),
                }
            })
            .collect();
        Self { entries }
    }

    /// Skill ids referenced by the input, deduplicated in first-seen order.
    /// The first id is the primary for response generation.
    pub fn detect(&self, text: &str) -> Vec<String> {
        let input = text.to_lowercase();

        let exact: Vec<String> = self
            .entries
            .iter()
            .filter(|e| input.contains(&e.title_lower) || input.contains(&e.id))
            .map(|e| e.id.clone())
            .collect();
        if !exact.is_empty() {
            return exact;
        }

        let partial: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.title_trigrams.iter().any(|t| input.contains(t)))
            .map(|e| e.id.clone())
            .collect();
        if !partial.is_empty() {
            return partial;
        }

        let gated = CONTEXT_TRIGGERS.iter().any(|t| input.contains(t))
            || input.len() < SHORT_INPUT_CHARS;
        if !gated {
            return Vec::new();
        }

        self.entries
            .iter()
            .filter(|e| e.keywords.iter().any(|k| input.contains(k.as_str())))
            .map(|e| e.id.clone())
            .collect()
    }

    /// Step navigation intent within an active session. Returns an empty
    /// update when the session is inactive or nothing matched.
    pub fn detect_step_intent(
        &self,
        text: &str,
        session: &CoachingSession,
    ) -> CoachingUpdate {
        let (Some(current), Some(total)) = (session.current_step(), session.total_steps())
        else {
            return CoachingUpdate::none();
        };

        let input = text.to_lowercase();

        if END_PHRASES.iter().any(|p| input.contains(p)) {
            return CoachingUpdate::ended();
        }

        if let Some(captures) = STEP_NUMBER.captures(&input) {
            if let Ok(requested) = captures[1].parse::<u32>() {
                return CoachingUpdate::to_step(requested.clamp(1, total));
            }
        }

        if NEXT_PHRASES.iter().any(|p| input.contains(p)) {
            return CoachingUpdate::to_step((current + 1).min(total));
        }

        CoachingUpdate::none()
    }

    /// Whether the input asks for an alternative to the current skill.
    pub fn wants_alternative(&self, text: &str) -> bool {
        let input = text.to_lowercase();
        ALTERNATIVE_PHRASES.iter().any(|p| input.contains(p))
    }

    /// Whether the input affirms a prior suggestion ("yes", "let's try it").
    pub fn is_affirmative(&self, text: &str) -> bool {
        let input = text.to_lowercase();
        AFFIRMATIVE_PHRASES.iter().any(|p| input.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> MentionDetector {
        MentionDetector::new(&SkillCatalog::load_default().unwrap())
    }

    #[test]
    fn test_every_title_detects_its_own_skill() {
        let catalog = SkillCatalog::load_default().unwrap();
        let detector = MentionDetector::new(&catalog);
        for skill in catalog.list() {
            let hits = detector.detect(&skill.title);
            assert!(
                hits.contains(&skill.id),
                "title {:?} did not detect {}",
                skill.title,
                skill.id
            );
        }
    }

    #[test]
    fn test_exact_id_match() {
        let hits = detector().detect("I keep hearing about balance-your-thinking, is it real?");
        assert_eq!(hits, vec!["balance-your-thinking".to_string()]);
    }

    #[test]
    fn test_trigram_match_with_trailing_noise() {
        // First three words of "Good Listening & Celebrate Good News"
        let hits = detector().detect(
            "someone said good listening & something helps a lot with my partner and family",
        );
        assert!(hits.contains(&"good-listening".to_string()));
    }

    #[test]
    fn test_keyword_needs_context_in_long_input() {
        let d = detector();
        // Long input, keyword "meditation", no trigger phrase
        let long = "my neighbor does meditation every single morning before work and seems to enjoy the quiet time immensely";
        assert!(d.detect(long).is_empty());

        // Same keyword with a trigger phrase
        let hits = d.detect("tell me about meditation and whether it could work for someone like me");
        assert!(hits.contains(&"mindfulness".to_string()));
    }

    #[test]
    fn test_short_input_skips_context_gate() {
        let hits = detector().detect("meditation?");
        assert!(hits.contains(&"mindfulness".to_string()));
    }

    #[test]
    fn test_step_jump_clamps() {
        let d = detector();
        let session = CoachingSession::start("mindfulness", 3);

        assert_eq!(
            d.detect_step_intent("go to step 2", &session),
            CoachingUpdate::to_step(2)
        );
        assert_eq!(
            d.detect_step_intent("step 0 please", &session),
            CoachingUpdate::to_step(1)
        );
        assert_eq!(
            d.detect_step_intent("step 9", &session),
            CoachingUpdate::to_step(3)
        );
    }

    #[test]
    fn test_next_advances_and_saturates() {
        let d = detector();
        let mut session = CoachingSession::start("foundations-resilience", 7);
        session.jump(3);
        assert_eq!(
            d.detect_step_intent("what's next", &session),
            CoachingUpdate::to_step(4)
        );

        session.jump(7);
        assert_eq!(
            d.detect_step_intent("next", &session),
            CoachingUpdate::to_step(7)
        );
    }

    #[test]
    fn test_end_intent() {
        let d = detector();
        let session = CoachingSession::start("reframe", 4);
        assert_eq!(
            d.detect_step_intent("I'm done for today", &session),
            CoachingUpdate::ended()
        );
    }

    #[test]
    fn test_no_intent_without_session() {
        let d = detector();
        assert_eq!(
            d.detect_step_intent("next step", &CoachingSession::Inactive),
            CoachingUpdate::none()
        );
    }

    #[test]
    fn test_alternative_request() {
        let d = detector();
        assert!(d.wants_alternative("can we try something else"));
        assert!(!d.wants_alternative("this step is hard"));
    }
}
