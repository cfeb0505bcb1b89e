//! Suggestion ranker
//!
//! Pure function of the tuning tables and the input text. Keyword hits set
//! a base confidence, boost rules add domain-specific weight, situation
//! phrases append pre-ranked lists at flat confidence. Ties keep insertion
//! order: keyword matches land before situation matches, both in catalog
//! and table order.

use coach_config::{SkillCatalog, SuggestionConfig};
use coach_core::{SkillSuggestion, WellbeingDomain};

/// Flat confidence for assessment-driven domain suggestions.
const DOMAIN_CONFIDENCE: f32 = 0.8;

pub struct SuggestionRanker {
    config: SuggestionConfig,
}

impl SuggestionRanker {
    pub fn new(config: SuggestionConfig) -> Self {
        Self { config }
    }

    /// Rank catalog skills against free text, highest confidence first,
    /// truncated to `max_results`.
    pub fn rank(
        &self,
        text: &str,
        catalog: &SkillCatalog,
        max_results: usize,
    ) -> Vec<SkillSuggestion> {
        let input = text.to_lowercase();
        let weights = &self.config.weights;
        let mut suggestions: Vec<SkillSuggestion> = Vec::new();

        // Keyword scoring, in catalog order for stable ties.
        for skill in catalog.list() {
            let Some(keywords) = self.config.keyword_map.get(&skill.id) else {
                continue;
            };
            let matched: Vec<&str> = keywords
                .iter()
                .filter(|k| input.contains(k.as_str()))
                .map(|k| k.as_str())
                .collect();
            if matched.is_empty() {
                continue;
            }

            let mut confidence = weights
                .cap
                .min(weights.base + weights.per_hit * matched.len() as f32);

            for boost in &self.config.boosts {
                let triggered = boost.triggers.iter().any(|t| input.contains(t.as_str()));
                if triggered && boost.skills.iter().any(|s| s == &skill.id) {
                    confidence += boost.amount;
                }
            }
            confidence = confidence.min(weights.cap);

            suggestions.push(SkillSuggestion {
                skill_id: skill.id.clone(),
                title: skill.title.clone(),
                confidence,
                trigger: Some(matched[..matched.len().min(3)].join(", ")),
                quote: Some(skill.goal.clone()),
            });
        }

        // Situation phrases append pre-ranked lists for skills not yet seen.
        for rule in &self.config.situations {
            if !input.contains(rule.phrase.as_str()) {
                continue;
            }
            for skill_id in &rule.skills {
                if suggestions.iter().any(|s| &s.skill_id == skill_id) {
                    continue;
                }
                let Some(skill) = catalog.get(skill_id) else {
                    continue;
                };
                suggestions.push(SkillSuggestion {
                    skill_id: skill.id.clone(),
                    title: skill.title.clone(),
                    confidence: rule.confidence,
                    trigger: Some(rule.phrase.clone()),
                    quote: Some(skill.goal.clone()),
                });
            }
        }

        // Stable sort preserves insertion order on ties.
        suggestions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        suggestions.truncate(max_results);
        suggestions
    }

    /// Suggestions for assessment-identified weak wellbeing domains.
    /// Relevance is the number of weak domains a skill covers; ties break
    /// by title so assessment output is stable.
    pub fn rank_for_domains(
        &self,
        domains: &[WellbeingDomain],
        catalog: &SkillCatalog,
        max_results: usize,
    ) -> Vec<SkillSuggestion> {
        let mut scored: Vec<(usize, &coach_core::Skill)> = catalog
            .list()
            .iter()
            .filter_map(|skill| {
                let hits = domains
                    .iter()
                    .filter(|d| skill.supports_domain(**d))
                    .count();
                (hits > 0).then_some((hits, skill))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.title.cmp(&b.1.title)));

        scored
            .into_iter()
            .take(max_results)
            .map(|(_, skill)| SkillSuggestion {
                skill_id: skill.id.clone(),
                title: skill.title.clone(),
                confidence: DOMAIN_CONFIDENCE,
                trigger: Some(
                    domains
                        .iter()
                        .filter(|d| skill.supports_domain(**d))
                        .map(|d| d.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
                quote: Some(skill.goal.clone()),
            })
            .collect()
    }

    /// Whether the input signals a desire for guidance. Gates suggestion
    /// attachment on general LLM turns.
    pub fn has_need_signal(&self, text: &str) -> bool {
        let input = text.to_lowercase();
        self.config
            .need_signals
            .iter()
            .any(|s| input.contains(s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (SuggestionRanker, SkillCatalog) {
        (
            SuggestionRanker::new(SuggestionConfig::load_default().unwrap()),
            SkillCatalog::load_default().unwrap(),
        )
    }

    #[test]
    fn test_confidence_monotonic_in_hits() {
        let (ranker, catalog) = fixtures();

        let one = ranker.rank("I feel so much tension", &catalog, 5);
        let two = ranker.rank("I feel so much tension and conflict", &catalog, 5);

        let single = one
            .iter()
            .find(|s| s.skill_id == "interpersonal-problem-solving")
            .unwrap();
        let double = two
            .iter()
            .find(|s| s.skill_id == "interpersonal-problem-solving")
            .unwrap();

        assert!(double.confidence >= single.confidence);
        assert!(double.confidence <= 0.95);
    }

    #[test]
    fn test_confidence_never_exceeds_cap() {
        let (ranker, catalog) = fixtures();
        let text = "anxiety anxious panic worried nervous tense stress stressed overwhelmed restless jittery agitated calm mindful breathe";
        let ranked = ranker.rank(text, &catalog, 10);
        for suggestion in ranked {
            assert!(
                suggestion.confidence <= 0.95,
                "{} exceeded cap: {}",
                suggestion.skill_id,
                suggestion.confidence
            );
        }
    }

    #[test]
    fn test_job_anxiety_ranks_thinking_skills_first() {
        let (ranker, catalog) = fixtures();
        let ranked = ranker.rank(
            "I'm feeling really anxious about losing my job",
            &catalog,
            3,
        );

        assert!(!ranked.is_empty());
        let top_ids: Vec<&str> = ranked.iter().map(|s| s.skill_id.as_str()).collect();
        assert!(
            top_ids.contains(&"balance-your-thinking") || top_ids.contains(&"reframe"),
            "got {top_ids:?}"
        );
        // Unrelated skills must not outrank the boosted ones.
        let spiritual_pos = top_ids.iter().position(|id| *id == "spiritual-resilience");
        assert!(spiritual_pos.is_none() || spiritual_pos > Some(0));
    }

    #[test]
    fn test_situation_phrase_appends_unseen_skills() {
        let (ranker, catalog) = fixtures();
        let ranked = ranker.rank("there is so much conflict at home", &catalog, 3);
        assert!(ranked
            .iter()
            .any(|s| s.skill_id == "interpersonal-problem-solving"));
    }

    #[test]
    fn test_no_matches_yields_empty() {
        let (ranker, catalog) = fixtures();
        assert!(ranker.rank("the weather is fine", &catalog, 3).is_empty());
    }

    #[test]
    fn test_domain_suggestions() {
        let (ranker, catalog) = fixtures();
        let ranked = ranker.rank_for_domains(&[WellbeingDomain::Social], &catalog, 3);
        assert!(!ranked.is_empty());
        assert!(ranked
            .iter()
            .all(|s| catalog.get(&s.skill_id).unwrap().supports_domain(WellbeingDomain::Social)));
    }

    #[test]
    fn test_domain_overlap_ranks_first() {
        let (ranker, catalog) = fixtures();
        let ranked = ranker.rank_for_domains(
            &[WellbeingDomain::Social, WellbeingDomain::Family],
            &catalog,
            5,
        );
        // Skills covering both weak domains come before single-domain ones.
        let first = catalog.get(&ranked[0].skill_id).unwrap();
        assert!(first.supports_domain(WellbeingDomain::Social));
        assert!(first.supports_domain(WellbeingDomain::Family));
    }

    #[test]
    fn test_need_signal_gate() {
        let (ranker, _) = fixtures();
        assert!(ranker.has_need_signal("I'm stuck, what should I do?"));
        assert!(!ranker.has_need_signal("nice day out"));
    }
}
