//! Safety triage rule tables
//!
//! Escalation pattern families, the staged distress vocabulary, and the
//! region-specific crisis contact blocks. Patterns are stored as strings
//! here; the engine compiles them at startup.

use std::path::Path;

use serde::Deserialize;

use coach_core::EscalationReason;

use crate::ConfigError;

const DEFAULT_SAFETY_YAML: &str = include_str!("../data/safety.yaml");

/// One ordered escalation pattern family.
#[derive(Debug, Clone, Deserialize)]
pub struct EscalationFamily {
    pub reason: EscalationReason,
    pub patterns: Vec<String>,
}

/// Staged distress keyword vocabulary.
#[derive(Debug, Clone, Deserialize)]
pub struct DistressVocabulary {
    pub critical: Vec<String>,
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
}

/// Supportive preambles keyed by distress level.
#[derive(Debug, Clone, Deserialize)]
pub struct DistressPreambles {
    pub high: String,
    pub medium: String,
    pub low: String,
}

/// Fixed framing around the contact blocks in an escalation message.
#[derive(Debug, Clone, Deserialize)]
pub struct EscalationMessage {
    pub header: String,
    pub footer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactResource {
    pub name: String,
    pub phone: String,
    pub available: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionContacts {
    pub region: String,
    pub label: String,
    pub resources: Vec<ContactResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SafetyConfig {
    pub escalation: Vec<EscalationFamily>,
    pub distress: DistressVocabulary,
    pub preambles: DistressPreambles,
    pub message: EscalationMessage,
    pub contacts: Vec<RegionContacts>,
}

impl SafetyConfig {
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::from_yaml(DEFAULT_SAFETY_YAML)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|_| {
            ConfigError::FileNotFound(path.as_ref().display().to_string())
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        if config.escalation.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "escalation".to_string(),
                message: "at least one escalation family is required".to_string(),
            });
        }
        Ok(config)
    }

    /// Contact blocks for a region key, or all regions for an unknown key.
    pub fn contacts_for(&self, region: &str) -> Vec<&RegionContacts> {
        let matched: Vec<&RegionContacts> = self
            .contacts
            .iter()
            .filter(|c| c.region == region)
            .collect();
        if matched.is_empty() {
            self.contacts.iter().collect()
        } else {
            matched
        }
    }
}
