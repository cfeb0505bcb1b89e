//! Engine response and side-channel metadata types

use serde::{Deserialize, Serialize};

use crate::session::CoachingUpdate;

/// Why a response carries the escalation flag.
///
/// Ordered by triage precedence: when multiple families match the same
/// input, the earliest variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationReason {
    /// First-person admission of committing a violent crime
    CrimeAdmission,
    /// Stated intent to harm another person
    ImminentThreat,
    /// Active self-harm or suicide risk
    SelfHarm,
}

/// Staged distress severity detected in an utterance.
///
/// Drives the supportive preamble on otherwise-normal responses. `Low`
/// never escalates and never changes routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistressLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Which composer branch produced the response text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Safety triage override
    Safety,
    /// Scripted curriculum-verbatim skill response
    Scripted,
    /// Step-scoped coaching reply from the LLM
    CoachingStep,
    /// General LLM reply
    Llm,
    /// Static fallback after LLM failure
    Fallback,
}

/// A ranked skill recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSuggestion {
    pub skill_id: String,
    pub title: String,
    /// Ranker confidence in `[0.0, 0.95]`
    pub confidence: f32,
    /// The keyword or phrase that triggered the match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    /// Verbatim goal text for display alongside the suggestion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
}

/// UI navigation actions attached to a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Navigate to a skill's detail view
    OpenSkill { skill_id: String },
    /// Add a skill to the user's practice kit
    AddToPracticeKit { skill_id: String },
}

/// Everything the engine returns for one user turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachResponse {
    /// Reply text shown to the user
    pub text: String,
    /// Ranked suggestions, highest confidence first
    #[serde(default)]
    pub suggested_skills: Vec<SkillSuggestion>,
    /// Skills the user's input explicitly referenced
    #[serde(default)]
    pub mentioned_skill_ids: Vec<String>,
    /// Whether the caller must surface crisis resources
    pub requires_escalation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_reason: Option<EscalationReason>,
    /// Session transition for the caller to apply
    #[serde(default)]
    pub coaching: CoachingUpdate,
    /// Navigation actions attached to the reply
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Composer branch that produced `text`
    pub source: ResponseSource,
    /// Monotonic id for stale-response discard
    pub turn_id: u64,
}

impl CoachResponse {
    pub fn new(text: impl Into<String>, source: ResponseSource, turn_id: u64) -> Self {
        Self {
            text: text.into(),
            suggested_skills: Vec::new(),
            mentioned_skill_ids: Vec::new(),
            requires_escalation: false,
            escalation_reason: None,
            coaching: CoachingUpdate::none(),
            actions: Vec::new(),
            source,
            turn_id,
        }
    }
}
