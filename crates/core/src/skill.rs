//! Skill catalog entry types
//!
//! A skill is an immutable curriculum entry. Its `goal`, `when_to_use`,
//! `steps` and `benefits` strings are curriculum-verbatim: they are quoted
//! character-for-character in responses and must never be paraphrased.

use serde::{Deserialize, Serialize};

/// Wellbeing domains a skill supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WellbeingDomain {
    Emotional,
    Social,
    Family,
    Spiritual,
}

impl WellbeingDomain {
    pub const ALL: [WellbeingDomain; 4] = [
        WellbeingDomain::Emotional,
        WellbeingDomain::Social,
        WellbeingDomain::Family,
        WellbeingDomain::Spiritual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WellbeingDomain::Emotional => "emotional",
            WellbeingDomain::Social => "social",
            WellbeingDomain::Family => "family",
            WellbeingDomain::Spiritual => "spiritual",
        }
    }
}

impl std::fmt::Display for WellbeingDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Curriculum training modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurriculumModule {
    Foundation,
    #[serde(rename = "Values & Meaning")]
    ValuesAndMeaning,
    #[serde(rename = "Resilient Thinking")]
    ResilientThinking,
    #[serde(rename = "Social Resilience")]
    SocialResilience,
}

/// A single catalog skill
///
/// Loaded once at startup from static configuration and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    /// Stable slug, unique within the catalog
    pub id: String,
    /// Display title
    pub title: String,
    /// Goal statement (verbatim, single paragraph)
    pub goal: String,
    /// When-to-use guidance (verbatim)
    pub when_to_use: String,
    /// Ordered practice steps (verbatim, 1-indexed semantics, never empty)
    pub steps: Vec<String>,
    /// Evidence-backed benefits (verbatim, may be empty)
    #[serde(default)]
    pub benefits: Vec<String>,
    /// Wellbeing domains this skill supports
    pub domains: Vec<WellbeingDomain>,
    /// Curriculum modules this skill belongs to
    pub modules: Vec<CurriculumModule>,
    /// Curated mention keywords (gated by context triggers at detection time)
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Skill {
    pub fn total_steps(&self) -> u32 {
        self.steps.len() as u32
    }

    /// Step text by 1-indexed step number, if in range.
    pub fn step(&self, number: u32) -> Option<&str> {
        if number == 0 {
            return None;
        }
        self.steps.get(number as usize - 1).map(|s| s.as_str())
    }

    pub fn supports_domain(&self, domain: WellbeingDomain) -> bool {
        self.domains.contains(&domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Skill {
        Skill {
            id: "mindfulness".into(),
            title: "Mindfulness".into(),
            goal: "helps you reduce stress and distraction.".into(),
            when_to_use: "Regularly; when distracted.".into(),
            steps: vec!["Practice informally".into(), "Practice formally".into()],
            benefits: vec![],
            domains: vec![WellbeingDomain::Emotional],
            modules: vec![CurriculumModule::Foundation],
            keywords: vec!["meditation".into()],
        }
    }

    #[test]
    fn test_step_is_one_indexed() {
        let skill = sample();
        assert_eq!(skill.step(1), Some("Practice informally"));
        assert_eq!(skill.step(2), Some("Practice formally"));
        assert_eq!(skill.step(0), None);
        assert_eq!(skill.step(3), None);
        assert_eq!(skill.total_steps(), 2);
    }

    #[test]
    fn test_domain_membership() {
        let skill = sample();
        assert!(skill.supports_domain(WellbeingDomain::Emotional));
        assert!(!skill.supports_domain(WellbeingDomain::Spiritual));
    }

    #[test]
    fn test_module_serde_names() {
        let module: CurriculumModule =
            serde_json::from_str("\"Values & Meaning\"").unwrap();
        assert_eq!(module, CurriculumModule::ValuesAndMeaning);
    }
}
