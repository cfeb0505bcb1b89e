//! Configuration for the coaching response engine
//!
//! Two kinds of configuration live here:
//! - Domain data (skill catalog, coach roster, suggestion tables, safety
//!   rules), embedded as YAML defaults and overridable from files
//! - Runtime settings, loaded from config files and environment variables
//!   (COACH_ prefix)

pub mod catalog;
pub mod roster;
pub mod safety;
pub mod settings;
pub mod suggestions;

pub use catalog::SkillCatalog;
pub use roster::CoachRoster;
pub use safety::{
    ContactResource, EscalationFamily, RegionContacts, SafetyConfig,
};
pub use settings::{load_settings, LlmSettings, Region, RuntimeEnvironment, Settings};
pub use suggestions::{BoostRule, SituationRule, SuggestionConfig, Weights};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
