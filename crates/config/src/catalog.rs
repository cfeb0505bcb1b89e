//! Skill catalog loading and lookup
//!
//! The catalog is loaded once at startup and treated as immutable. Lookups
//! are total: an unknown id returns `None`, never an error.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use coach_core::{Skill, WellbeingDomain};

use crate::ConfigError;

const DEFAULT_SKILLS_YAML: &str = include_str!("../data/skills.yaml");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    skills: Vec<Skill>,
}

/// Indexed, read-only skill catalog.
#[derive(Debug, Clone)]
pub struct SkillCatalog {
    skills: Vec<Skill>,
    by_id: HashMap<String, usize>,
}

impl SkillCatalog {
    /// Load the embedded default catalog.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::from_yaml(DEFAULT_SKILLS_YAML)
    }

    /// Load a catalog from a YAML file, for deployments that override the
    /// embedded curriculum.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|_| {
            ConfigError::FileNotFound(path.as_ref().display().to_string())
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        let catalog = Self::build(file.skills)?;
        tracing::debug!(skills = catalog.len(), "skill catalog loaded");
        Ok(catalog)
    }

    fn build(skills: Vec<Skill>) -> Result<Self, ConfigError> {
        if skills.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "skills".to_string(),
                message: "catalog must contain at least one skill".to_string(),
            });
        }

        let mut by_id = HashMap::with_capacity(skills.len());
        for (idx, skill) in skills.iter().enumerate() {
            if skill.steps.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("skills.{}.steps", skill.id),
                    message: "every skill needs at least one step".to_string(),
                });
            }
            if by_id.insert(skill.id.clone(), idx).is_some() {
                return Err(ConfigError::InvalidValue {
                    field: "skills".to_string(),
                    message: format!("duplicate skill id: {}", skill.id),
                });
            }
        }

        Ok(Self { skills, by_id })
    }

    pub fn get(&self, id: &str) -> Option<&Skill> {
        self.by_id.get(id).map(|&idx| &self.skills[idx])
    }

    pub fn list(&self) -> &[Skill] {
        &self.skills
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Skills tagged with the given wellbeing domain, in catalog order.
    /// Feeds assessment-driven suggestions.
    pub fn for_domain(&self, domain: WellbeingDomain) -> Vec<&Skill> {
        self.skills
            .iter()
            .filter(|s| s.supports_domain(domain))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_loads() {
        let catalog = SkillCatalog::load_default().unwrap();
        assert_eq!(catalog.len(), 11);
        assert!(catalog.get("mindfulness").is_some());
        assert!(catalog.get("no-such-skill").is_none());
    }

    #[test]
    fn test_every_skill_has_steps_and_domains() {
        let catalog = SkillCatalog::load_default().unwrap();
        for skill in catalog.list() {
            assert!(!skill.steps.is_empty(), "{} has no steps", skill.id);
            assert!(!skill.domains.is_empty(), "{} has no domains", skill.id);
            assert!(!skill.goal.is_empty(), "{} has no goal", skill.id);
        }
    }

    #[test]
    fn test_verbatim_mindfulness_content() {
        let catalog = SkillCatalog::load_default().unwrap();
        let skill = catalog.get("mindfulness").unwrap();
        assert_eq!(
            skill.goal,
            "helps you reduce stress and distraction; stay focused, calm, and engaged."
        );
        assert_eq!(
            skill.when_to_use,
            "Regularly; when distracted; when stressed or overwhelmed."
        );
        assert_eq!(skill.total_steps(), 3);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let yaml = r#"
skills:
  - id: a
    title: A
    goal: g
    when_to_use: w
    steps: [one]
    domains: [emotional]
    modules: [Foundation]
  - id: a
    title: A again
    goal: g
    when_to_use: w
    steps: [one]
    domains: [emotional]
    modules: [Foundation]
"#;
        assert!(SkillCatalog::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_domain_filter() {
        let catalog = SkillCatalog::load_default().unwrap();
        let spiritual = catalog.for_domain(WellbeingDomain::Spiritual);
        assert!(spiritual.iter().any(|s| s.id == "spiritual-resilience"));
    }
}
