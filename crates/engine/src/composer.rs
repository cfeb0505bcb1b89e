//! Response composition
//!
//! One entry point, `CoachEngine::respond`, walks a fixed precedence
//! ladder: safety triage, scripted skill delivery, the active coaching
//! session, then the general LLM path with a static fallback. Everything
//! above the LLM path is deterministic so the high-stakes and
//! curriculum-verbatim branches never depend on model output.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use coach_config::{CoachRoster, SafetyConfig, SkillCatalog, SuggestionConfig};
use coach_core::{
    Action, CoachResponse, CoachingSession, CoachingUpdate, DistressLevel, Persona,
    ResponseSource, Skill, Turn,
};
use coach_llm::{build_messages, estimate_tokens, LlmBackend};

use crate::mention::MentionDetector;
use crate::style::PromptSynthesizer;
use crate::suggest::SuggestionRanker;
use crate::triage::SafetyTriage;

/// Steps shown inline in a scripted response before offering the rest.
const SCRIPTED_STEP_PREVIEW: u32 = 3;

/// Benefits shown in a scripted response.
const SCRIPTED_BENEFIT_LIMIT: usize = 2;

const FALLBACK_TEXTS: &[&str] = &[
    "I'm having trouble putting a response together right now, but I heard you.",
    "Something went wrong on my end while I was thinking that over.",
    "I couldn't finish that thought just now. Could you say it again in a moment?",
];

#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Prior turns included in an LLM request
    pub history_window: usize,
    /// Maximum suggestions attached to any response
    pub max_suggestions: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            history_window: 6,
            max_suggestions: 3,
        }
    }
}

/// One user turn, borrowed from the caller.
pub struct TurnRequest<'a> {
    pub history: &'a [Turn],
    pub input: &'a str,
    /// Requested coach id or display name
    pub coach: Option<&'a str>,
    pub session: &'a CoachingSession,
}

pub struct CoachEngine {
    catalog: SkillCatalog,
    roster: CoachRoster,
    ranker: SuggestionRanker,
    mentions: MentionDetector,
    triage: SafetyTriage,
    synthesizer: PromptSynthesizer,
    backend: Arc<dyn LlmBackend>,
    options: EngineOptions,
    turn_counter: AtomicU64,
}

impl CoachEngine {
    pub fn new(
        catalog: SkillCatalog,
        roster: CoachRoster,
        suggestions: SuggestionConfig,
        safety: SafetyConfig,
        region: &str,
        backend: Arc<dyn LlmBackend>,
        options: EngineOptions,
    ) -> Self {
        let mentions = MentionDetector::new(&catalog);
        Self {
            catalog,
            roster,
            ranker: SuggestionRanker::new(suggestions),
            mentions,
            triage: SafetyTriage::new(safety, region),
            synthesizer: PromptSynthesizer::new(),
            backend,
            options,
            turn_counter: AtomicU64::new(0),
        }
    }

    /// Greeting for a fresh conversation with the given coach.
    pub fn welcome(&self, coach: Option<&str>) -> String {
        self.roster.resolve(coach).welcome
    }

    /// Build the session value for starting a walkthrough of `skill_id`.
    /// Callers use this after the user accepts a suggested skill.
    pub fn begin_session(&self, skill_id: &str) -> Option<CoachingSession> {
        let skill = self.catalog.get(skill_id)?;
        Some(CoachingSession::start(&skill.id, skill.total_steps()))
    }

    /// Whether the input affirms a prior suggestion. Lets the caller decide
    /// to `begin_session` for the last suggested skill.
    pub fn is_affirmative(&self, text: &str) -> bool {
        self.mentions.is_affirmative(text)
    }

    /// Compose the reply for one user turn.
    pub async fn respond(&self, request: TurnRequest<'_>) -> CoachResponse {
        let turn_id = self.turn_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let persona = self.roster.resolve(request.coach);
        let outcome = self.triage.assess(request.input);

        if let Some(reason) = outcome.escalation {
            tracing::warn!(turn_id, ?reason, "escalating turn to safety response");
            let mut response =
                CoachResponse::new(self.triage.escalation_message(), ResponseSource::Safety, turn_id);
            response.requires_escalation = true;
            response.escalation_reason = Some(reason);
            return response;
        }

        let mentioned = self.mentions.detect(request.input);

        if !request.session.is_active() {
            if let Some(skill) = mentioned.first().and_then(|id| self.catalog.get(id)) {
                return self.scripted_response(
                    &persona,
                    skill,
                    &mentioned,
                    request.input,
                    outcome.distress,
                    turn_id,
                );
            }
            return self
                .general_response(&persona, &request, outcome.distress, turn_id)
                .await;
        }

        self.session_response(&persona, &request, &mentioned, turn_id)
            .await
    }

    /// Curriculum-verbatim skill delivery. No LLM involvement; every piece
    /// of skill text is copied from the catalog.
    fn scripted_response(
        &self,
        persona: &Persona,
        skill: &Skill,
        mentioned: &[String],
        input: &str,
        distress: Option<DistressLevel>,
        turn_id: u64,
    ) -> CoachResponse {
        let total = skill.total_steps();
        let preview = total.min(SCRIPTED_STEP_PREVIEW);

        let mut text = String::new();
        if let Some(preamble) = self.distress_preamble(distress, false) {
            text.push_str(preamble);
            text.push_str("\n\n");
        }

        text.push_str(&persona.intro_for(&skill.title));
        text.push_str(&format!("\n\n**{}** {}\n\n", skill.title, skill.goal));
        text.push_str(&format!("When to use it: {}\n\n", skill.when_to_use));

        for number in 1..=preview {
            if let Some(step) = skill.step(number) {
                text.push_str(&format!("{number}. {step}\n"));
            }
        }
        if total > preview {
            text.push_str(&format!(
                "\nThat's the first {preview} of {total} steps. Want me to walk you through the rest?\n"
            ));
        }

        let benefits: Vec<&String> = skill.benefits.iter().take(SCRIPTED_BENEFIT_LIMIT).collect();
        if !benefits.is_empty() {
            text.push_str("\nWhy it helps:\n");
            for benefit in benefits {
                text.push_str(&format!("- {benefit}\n"));
            }
        }

        text.push('\n');
        text.push_str(&persona.encouragement);

        let mut response = CoachResponse::new(text, ResponseSource::Scripted, turn_id);
        response.mentioned_skill_ids = mentioned.to_vec();
        response.actions = vec![Action::OpenSkill {
            skill_id: skill.id.clone(),
        }];
        response.suggested_skills = self
            .ranker
            .rank(input, &self.catalog, self.options.max_suggestions + 1)
            .into_iter()
            .filter(|s| s.skill_id != skill.id)
            .take(self.options.max_suggestions)
            .collect();
        response
    }

    /// Turns inside an active walkthrough: step navigation, completion,
    /// alternate-skill requests, and the step-scoped LLM reply.
    async fn session_response(
        &self,
        persona: &Persona,
        request: &TurnRequest<'_>,
        mentioned: &[String],
        turn_id: u64,
    ) -> CoachResponse {
        let session = request.session;
        let update = self.mentions.detect_step_intent(request.input, session);
        let active_skill = session.skill_id().and_then(|id| self.catalog.get(id));

        let Some(skill) = active_skill else {
            // Session references a skill the catalog no longer has.
            tracing::warn!(turn_id, skill_id = ?session.skill_id(), "active session skill missing from catalog");
            let mut response = CoachResponse::new(
                format!("Let's start fresh. {}", persona.fallback_tail),
                ResponseSource::Fallback,
                turn_id,
            );
            response.coaching = CoachingUpdate::ended();
            return response;
        };

        if update.end {
            let text = format!(
                "Great work. You made it through {}. {}",
                skill.title, persona.encouragement
            );
            let mut response = CoachResponse::new(text, ResponseSource::CoachingStep, turn_id);
            response.coaching = update;
            // A finished walkthrough is worth keeping around.
            response.actions = vec![Action::AddToPracticeKit {
                skill_id: skill.id.clone(),
            }];
            return response;
        }

        let other_mention = mentioned
            .iter()
            .find(|id| id.as_str() != skill.id)
            .and_then(|id| self.catalog.get(id));
        if other_mention.is_some() || self.mentions.wants_alternative(request.input) {
            return self.alternate_response(persona, skill, other_mention, request.input, update, turn_id);
        }

        // Prompt at the post-navigation step so text and state agree.
        let mut effective = session.clone();
        effective.apply(&update);
        let step_number = effective.current_step().unwrap_or(1);

        let prompt = self.synthesizer.build_step_prompt(persona, skill, step_number);
        let messages = build_messages(&prompt, request.history, request.input, self.options.history_window);

        let mut response = match self.backend.generate(&messages).await {
            Ok(reply) => CoachResponse::new(reply, ResponseSource::CoachingStep, turn_id),
            Err(error) => {
                tracing::warn!(turn_id, %error, "step reply failed, using step text directly");
                let step_text = skill.step(step_number).unwrap_or_default();
                CoachResponse::new(
                    format!(
                        "Step {step_number} of {}: {step_text}\n\n{}",
                        skill.total_steps(),
                        persona.encouragement
                    ),
                    ResponseSource::Fallback,
                    turn_id,
                )
            }
        };
        response.coaching = update;
        response
    }

    /// Exactly one alternative suggestion while a session is active, either
    /// the skill the user named or the top-ranked match.
    fn alternate_response(
        &self,
        persona: &Persona,
        current: &Skill,
        named: Option<&Skill>,
        input: &str,
        update: CoachingUpdate,
        turn_id: u64,
    ) -> CoachResponse {
        let suggestion = match named {
            Some(skill) => Some(coach_core::SkillSuggestion {
                skill_id: skill.id.clone(),
                title: skill.title.clone(),
                confidence: 0.9,
                trigger: None,
                quote: Some(skill.goal.clone()),
            }),
            None => self
                .ranker
                .rank(input, &self.catalog, self.options.max_suggestions + 1)
                .into_iter()
                .find(|s| s.skill_id != current.id),
        };

        let Some(suggestion) = suggestion else {
            let text = format!(
                "Let's stay with {} for now. {}",
                current.title, persona.encouragement
            );
            let mut response = CoachResponse::new(text, ResponseSource::Scripted, turn_id);
            response.coaching = update;
            return response;
        };

        let text = format!(
            "{} could be a good fit for what you're describing. Want to switch to it, or keep going with {}?",
            suggestion.title, current.title
        );
        let mut response = CoachResponse::new(text, ResponseSource::Scripted, turn_id);
        response.actions = vec![Action::OpenSkill {
            skill_id: suggestion.skill_id.clone(),
        }];
        response.suggested_skills = vec![suggestion];
        response.coaching = update;
        response
    }

    /// General conversation through the LLM, with the static fallback when
    /// the backend fails. The reply is post-scanned so skills the model
    /// brings up become navigable.
    async fn general_response(
        &self,
        persona: &Persona,
        request: &TurnRequest<'_>,
        distress: Option<DistressLevel>,
        turn_id: u64,
    ) -> CoachResponse {
        let prompt = self.synthesizer.build_general_prompt(persona, &self.catalog);
        let messages = build_messages(&prompt, request.history, request.input, self.options.history_window);
        tracing::debug!(
            turn_id,
            prompt_tokens = estimate_tokens(&prompt),
            history = messages.len() - 2,
            "general prompt built"
        );

        let mut response = match self.backend.generate(&messages).await {
            Ok(reply) => {
                let mut response = CoachResponse::new(reply, ResponseSource::Llm, turn_id);
                response.mentioned_skill_ids = self.mentions.detect(&response.text);
                response.actions = response
                    .mentioned_skill_ids
                    .iter()
                    .map(|id| Action::OpenSkill {
                        skill_id: id.clone(),
                    })
                    .collect();
                response
            }
            Err(error) => {
                tracing::warn!(turn_id, %error, "llm request failed, using static fallback");
                let base = FALLBACK_TEXTS[(turn_id % FALLBACK_TEXTS.len() as u64) as usize];
                CoachResponse::new(
                    format!("{base} {}", persona.fallback_tail),
                    ResponseSource::Fallback,
                    turn_id,
                )
            }
        };

        if self.ranker.has_need_signal(request.input) {
            response.suggested_skills =
                self.ranker
                    .rank(request.input, &self.catalog, self.options.max_suggestions);
        }

        if let Some(preamble) = self.distress_preamble(distress, true) {
            response.text = format!("{preamble}\n\n{}", response.text);
        }

        response
    }

    /// Supportive preamble selection. Low distress only softens the general
    /// path; scripted delivery stays clean unless distress is medium or
    /// higher.
    fn distress_preamble(
        &self,
        distress: Option<DistressLevel>,
        include_low: bool,
    ) -> Option<&str> {
        let level = distress?;
        if level == DistressLevel::Low && !include_low {
            return None;
        }
        self.triage.preamble(level)
    }
}
