//! Safety triage
//!
//! Runs before everything else on every turn. Three ordered regex families
//! decide escalation; an independent staged keyword vocabulary grades
//! distress for the supportive baseline. Matching is deliberately broad
//! within each family because a false positive only shows a safe message,
//! while a false negative is unacceptable.

use regex::{Regex, RegexBuilder};

use coach_config::SafetyConfig;
use coach_core::{DistressLevel, EscalationReason};

struct CompiledFamily {
    reason: EscalationReason,
    patterns: Vec<Regex>,
}

/// Result of assessing one utterance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriageOutcome {
    /// Escalation short-circuit, pre-empts all other processing
    pub escalation: Option<EscalationReason>,
    /// Graded distress for the supportive baseline
    pub distress: Option<DistressLevel>,
}

pub struct SafetyTriage {
    families: Vec<CompiledFamily>,
    config: SafetyConfig,
    region: String,
}

impl SafetyTriage {
    /// Compile the configured rule tables. A pattern that fails to compile
    /// is skipped with a warning so one bad rule cannot disable triage.
    pub fn new(config: SafetyConfig, region: &str) -> Self {
        let families = config
            .escalation
            .iter()
            .map(|family| CompiledFamily {
                reason: family.reason,
                patterns: family
                    .patterns
                    .iter()
                    .filter_map(|pattern| {
                        match RegexBuilder::new(pattern).case_insensitive(true).build() {
                            Ok(regex) => Some(regex),
                            Err(error) => {
                                tracing::warn!(pattern, %error, "skipping bad safety pattern");
                                None
                            }
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            families,
            config,
            region: region.to_string(),
        }
    }

    /// Classify against the escalation families in priority order.
    pub fn classify(&self, text: &str) -> Option<EscalationReason> {
        for family in &self.families {
            if family.patterns.iter().any(|p| p.is_match(text)) {
                return Some(family.reason);
            }
        }
        None
    }

    /// Staged distress level from keyword containment, highest stage wins.
    pub fn distress_level(&self, text: &str) -> Option<DistressLevel> {
        let lower = text.to_lowercase();
        let vocab = &self.config.distress;
        let stages = [
            (DistressLevel::Critical, &vocab.critical),
            (DistressLevel::High, &vocab.high),
            (DistressLevel::Medium, &vocab.medium),
            (DistressLevel::Low, &vocab.low),
        ];
        for (level, keywords) in stages {
            if keywords.iter().any(|k| lower.contains(k.as_str())) {
                return Some(level);
            }
        }
        None
    }

    /// Full assessment. Critical-stage distress vocabulary escalates like
    /// the self-harm family; everything below only grades the reply.
    pub fn assess(&self, text: &str) -> TriageOutcome {
        let distress = self.distress_level(text);

        if let Some(reason) = self.classify(text) {
            return TriageOutcome {
                escalation: Some(reason),
                distress,
            };
        }

        if distress == Some(DistressLevel::Critical) {
            return TriageOutcome {
                escalation: Some(EscalationReason::SelfHarm),
                distress,
            };
        }

        TriageOutcome {
            escalation: None,
            distress,
        }
    }

    /// Supportive preamble for a non-escalated distress level.
    pub fn preamble(&self, level: DistressLevel) -> Option<&str> {
        match level {
            DistressLevel::High => Some(&self.config.preambles.high),
            DistressLevel::Medium => Some(&self.config.preambles.medium),
            DistressLevel::Low => Some(&self.config.preambles.low),
            DistressLevel::Critical => None,
        }
    }

    /// The fixed escalation message: header, region contact blocks, footer.
    /// Hand-authored text only, no curriculum content, no LLM involvement.
    pub fn escalation_message(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.config.message.header);
        out.push('\n');

        for block in self.config.contacts_for(&self.region) {
            out.push('\n');
            out.push_str(&block.label);
            out.push(':');
            for resource in &block.resources {
                out.push_str(&format!(
                    "\n- {}: {} ({})",
                    resource.name, resource.phone, resource.available
                ));
            }
            out.push('\n');
        }

        out.push('\n');
        out.push_str(&self.config.message.footer);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triage() -> SafetyTriage {
        SafetyTriage::new(SafetyConfig::load_default().unwrap(), "us")
    }

    #[test]
    fn test_self_harm_intent_escalates() {
        let t = triage();
        assert_eq!(
            t.classify("I am going to kill myself tonight"),
            Some(EscalationReason::SelfHarm)
        );
        assert_eq!(
            t.classify("i want to end my life"),
            Some(EscalationReason::SelfHarm)
        );
    }

    #[test]
    fn test_threat_escalates() {
        let t = triage();
        assert_eq!(
            t.classify("I am going to hurt someone at work"),
            Some(EscalationReason::ImminentThreat)
        );
    }

    #[test]
    fn test_crime_admission_wins_over_distress() {
        let t = triage();
        let outcome = t.assess("I killed someone and I feel so stressed");
        assert_eq!(outcome.escalation, Some(EscalationReason::CrimeAdmission));
    }

    #[test]
    fn test_low_distress_never_escalates() {
        let t = triage();
        let outcome = t.assess("I'm stressed and anxious about work");
        assert_eq!(outcome.escalation, None);
        assert_eq!(outcome.distress, Some(DistressLevel::Low));
    }

    #[test]
    fn test_plain_message_is_clean() {
        let t = triage();
        let outcome = t.assess("tell me about mindfulness");
        assert_eq!(outcome.escalation, None);
        assert_eq!(outcome.distress, None);
    }

    #[test]
    fn test_critical_vocabulary_escalates() {
        let t = triage();
        let outcome = t.assess("I have the pills ready");
        assert_eq!(outcome.escalation, Some(EscalationReason::SelfHarm));
    }

    #[test]
    fn test_escalation_message_has_us_numbers() {
        let message = triage().escalation_message();
        assert!(message.contains("988"));
        assert!(message.contains("911"));
        assert!(!message.to_lowercase().contains("goal"));
    }
}
