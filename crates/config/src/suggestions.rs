//! Suggestion ranker tuning tables
//!
//! Confidence weights, boost rules, and situation maps are product tuning.
//! They live in data so they can be retuned without touching ranker logic.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

const DEFAULT_SUGGESTIONS_YAML: &str = include_str!("../data/suggestions.yaml");

/// Confidence scoring weights.
#[derive(Debug, Clone, Deserialize)]
pub struct Weights {
    /// Base confidence once any keyword hits
    pub base: f32,
    /// Added per keyword hit
    pub per_hit: f32,
    /// Hard ceiling on any confidence
    pub cap: f32,
}

/// Additive confidence boost for specific skills when trigger phrases occur.
#[derive(Debug, Clone, Deserialize)]
pub struct BoostRule {
    pub triggers: Vec<String>,
    pub skills: Vec<String>,
    pub amount: f32,
}

/// Situation phrase mapped to a pre-ranked skill list at flat confidence.
#[derive(Debug, Clone, Deserialize)]
pub struct SituationRule {
    pub phrase: String,
    pub skills: Vec<String>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionConfig {
    pub weights: Weights,
    /// Per-skill keyword lists, keyed by skill id
    pub keyword_map: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub boosts: Vec<BoostRule>,
    #[serde(default)]
    pub situations: Vec<SituationRule>,
    /// Phrases gating suggestion attachment on general LLM turns
    #[serde(default)]
    pub need_signals: Vec<String>,
}

impl SuggestionConfig {
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::from_yaml(DEFAULT_SUGGESTIONS_YAML)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|_| {
            ConfigError::FileNotFound(path.as_ref().display().to_string())
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("weights.base", self.weights.base),
            ("weights.per_hit", self.weights.per_hit),
            ("weights.cap", self.weights.cap),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("must be between 0.0 and 1.0, got {value}"),
                });
            }
        }
        for rule in &self.situations {
            if !(0.0..=1.0).contains(&rule.confidence) {
                return Err(ConfigError::InvalidValue {
                    field: format!("situations.{}", rule.phrase),
                    message: format!(
                        "confidence must be between 0.0 and 1.0, got {}",
                        rule.confidence
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_load() {
        let config = SuggestionConfig::load_default().unwrap();
        assert_eq!(config.weights.base, 0.4);
        assert_eq!(config.weights.per_hit, 0.15);
        assert_eq!(config.weights.cap, 0.95);
        assert!(config.keyword_map.contains_key("mindfulness"));
        assert!(!config.situations.is_empty());
        assert!(!config.need_signals.is_empty());
    }

    #[test]
    fn test_job_anxiety_boost_present() {
        let config = SuggestionConfig::load_default().unwrap();
        let job = config
            .boosts
            .iter()
            .find(|b| b.triggers.iter().any(|t| t == "lose my job"))
            .unwrap();
        assert!(job.skills.contains(&"balance-your-thinking".to_string()));
        assert!((job.amount - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_out_of_range_confidence_rejected() {
        let yaml = r#"
weights: { base: 0.4, per_hit: 0.15, cap: 0.95 }
keyword_map: {}
situations:
  - phrase: test
    skills: [mindfulness]
    confidence: 1.5
"#;
        assert!(SuggestionConfig::from_yaml(yaml).is_err());
    }
}
