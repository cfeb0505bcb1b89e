//! Coach roster loading and persona resolution
//!
//! Requests may identify a coach by id or by display name. Resolution
//! precedence: id lookup, then case-insensitive name lookup, then a
//! synthesized generic persona. Downstream code always receives a complete
//! `Persona`, never a raw string.

use std::path::Path;

use serde::Deserialize;

use coach_core::Persona;

use crate::ConfigError;

const DEFAULT_COACHES_YAML: &str = include_str!("../data/coaches.yaml");

#[derive(Debug, Deserialize)]
struct RosterFile {
    coaches: Vec<Persona>,
}

/// Read-only coach roster.
#[derive(Debug, Clone)]
pub struct CoachRoster {
    coaches: Vec<Persona>,
}

impl CoachRoster {
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::from_yaml(DEFAULT_COACHES_YAML)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|_| {
            ConfigError::FileNotFound(path.as_ref().display().to_string())
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let file: RosterFile = serde_yaml::from_str(yaml)?;
        if file.coaches.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "coaches".to_string(),
                message: "roster must contain at least one coach".to_string(),
            });
        }
        Ok(Self {
            coaches: file.coaches,
        })
    }

    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.coaches.iter().find(|c| c.id == id)
    }

    pub fn list(&self) -> &[Persona] {
        &self.coaches
    }

    /// Resolve a requested coach identity to a full persona.
    ///
    /// `None` or an unknown identifier resolves to the generic persona so
    /// every turn has a usable voice.
    pub fn resolve(&self, requested: Option<&str>) -> Persona {
        let Some(requested) = requested else {
            return Persona::generic();
        };

        if let Some(by_id) = self.get(requested) {
            return by_id.clone();
        }

        let wanted = requested.to_lowercase();
        if let Some(by_name) = self
            .coaches
            .iter()
            .find(|c| c.display_name.to_lowercase() == wanted)
        {
            return by_name.clone();
        }

        tracing::debug!(requested, "unknown coach, using generic persona");
        Persona::generic()
    }
}
