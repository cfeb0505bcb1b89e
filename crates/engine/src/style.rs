//! Persona prompt synthesis
//!
//! Builds the LLM system prompts. The general prompt carries the full
//! curriculum so the model quotes skill text instead of inventing it; the
//! step prompt scopes the model to exactly one step of an active session.
//! Section order is fixed so prompt diffs stay reviewable.

use coach_config::SkillCatalog;
use coach_core::{Persona, Skill};

/// Substring rules mapped onto concrete style instructions. First match per
/// rule wins; a voice can trip several rules.
const STYLE_RULES: &[(&[&str], &str)] = &[
    (
        &["direct", "military", "no-nonsense"],
        "Keep sentences short and imperative. No hedging words.",
    ),
    (
        &["warm", "empath"],
        "Lead with empathy. Acknowledge the feeling before any advice.",
    ),
    (
        &["witty", "humor"],
        "One light, dry quip is allowed when the topic is not heavy.",
    ),
    (
        &["reflective"],
        "Ask one open question that invites the user to look inward.",
    ),
    (
        &["goal", "driven", "energetic"],
        "End with one concrete, small commitment the user can make today.",
    ),
];

const DEFAULT_STYLE: &str = "Be professional, supportive, and clear.";

pub struct PromptSynthesizer;

impl PromptSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Style instructions derived from the persona voice description.
    pub fn style_checklist(&self, voice: &str) -> Vec<&'static str> {
        let lower = voice.to_lowercase();
        let mut checklist: Vec<&'static str> = STYLE_RULES
            .iter()
            .filter(|(triggers, _)| triggers.iter().any(|t| lower.contains(t)))
            .map(|(_, instruction)| *instruction)
            .collect();
        if checklist.is_empty() {
            checklist.push(DEFAULT_STYLE);
        }
        checklist
    }

    /// System prompt for general conversation turns.
    pub fn build_general_prompt(&self, persona: &Persona, catalog: &SkillCatalog) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "You are {}, a resilience coach in a wellbeing app. Stay in character for every reply.\n\n",
            persona.display_name
        ));

        prompt.push_str(&format!("Your voice: {}\n\n", persona.voice));

        prompt.push_str("Style:\n");
        for instruction in self.style_checklist(&persona.voice) {
            prompt.push_str(&format!("- {instruction}\n"));
        }
        prompt.push('\n');

        prompt.push_str(
            "Always be supportive and non-judgmental. Validate what the user is feeling \
             before coaching them. Keep replies conversational and under 120 words unless \
             the user asks for detail.\n\n",
        );

        prompt.push_str(
            "When you present a skill from the catalog below, quote its goal, when-to-use, \
             and step text word for word. Format: one intro sentence, the skill title in \
             bold, the goal, when to use it, then the first 2-3 steps as a numbered list. \
             If the skill has more steps, offer to show the rest instead of listing them \
             all. Never paraphrase or invent step text.\n\n",
        );

        prompt.push_str("Rules you must never break:\n");
        prompt.push_str("- Never diagnose, never give medical or legal advice.\n");
        prompt.push_str("- Never invent skills, steps, or exercises outside the catalog.\n");
        prompt.push_str("- If the user mentions harming themselves or others, tell them to contact emergency services and a crisis line.\n");
        for guardrail in &persona.guardrails {
            prompt.push_str(&format!("- {guardrail}\n"));
        }
        prompt.push('\n');

        prompt.push_str("Skill catalog:\n");
        for skill in catalog.list() {
            prompt.push_str(&render_skill(skill));
        }

        prompt
    }

    /// System prompt for one step of an active coaching session. The model
    /// sees only the current step so it cannot wander ahead.
    pub fn build_step_prompt(
        &self,
        persona: &Persona,
        skill: &Skill,
        step_number: u32,
    ) -> String {
        let total = skill.total_steps();
        let step_text = skill.step(step_number).unwrap_or_default();

        let mut prompt = String::new();
        prompt.push_str(&format!(
            "You are {}, a resilience coach guiding the user through the skill \"{}\".\n\n",
            persona.display_name, skill.title
        ));

        prompt.push_str(&format!("Your voice: {}\n\n", persona.voice));

        prompt.push_str(&format!(
            "The user is on step {step_number} of {total}. The step text is:\n\"{step_text}\"\n\n",
        ));

        prompt.push_str(
            "Quote the step text word for word, then add at most three short sentences of \
             guidance in your voice. Do not reveal later steps. Do not suggest other skills \
             unless the user names a different skill or asks for an alternative.\n",
        );
        prompt.push_str(&format!("\nEncouragement to weave in: {}\n", persona.encouragement));

        prompt
    }
}

impl Default for PromptSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

fn render_skill(skill: &Skill) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n## {} (id: {})\n", skill.title, skill.id));
    out.push_str(&format!("Goal: {}\n", skill.goal));
    out.push_str(&format!("When to use: {}\n", skill.when_to_use));
    out.push_str("Steps:\n");
    for (idx, step) in skill.steps.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", idx + 1, step));
    }
    out
}
