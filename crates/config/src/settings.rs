//! Runtime settings
//!
//! Loaded from config files and environment variables (COACH_ prefix,
//! `__` separator). Domain data (catalog, roster, tables) loads separately;
//! settings only carry runtime knobs and file overrides.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Deployment region, selects which crisis contact blocks are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Us,
    Ca,
    Uk,
    Ie,
    /// Show every region's contacts
    #[default]
    All,
}

impl Region {
    pub fn as_key(&self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Ca => "ca",
            Region::Uk => "uk",
            Region::Ie => "ie",
            Region::All => "all",
        }
    }
}

/// LLM relay connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Relay endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier forwarded to the provider
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Retries after the first attempt, for transient network errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial retry backoff in milliseconds, doubled per attempt
    #[serde(default = "default_backoff_ms")]
    pub initial_backoff_ms: u64,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8787/chat".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    300
}
fn default_timeout() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_backoff_ms() -> u64 {
    250
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_backoff_ms(),
        }
    }
}

/// Optional file overrides for the embedded domain data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataPaths {
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub coaches: Option<String>,
    #[serde(default)]
    pub suggestions: Option<String>,
    #[serde(default)]
    pub safety: Option<String>,
}

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub region: Region,

    /// Recent non-system turns sent as LLM context
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Ranked suggestions attached per turn
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    /// Session entries older than this are discarded on load
    #[serde(default = "default_session_max_age_days")]
    pub session_max_age_days: u32,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub data: DataPaths,
}

fn default_history_window() -> usize {
    6
}
fn default_max_suggestions() -> usize {
    3
}
fn default_session_max_age_days() -> u32 {
    7
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: RuntimeEnvironment::default(),
            region: Region::default(),
            history_window: default_history_window(),
            max_suggestions: default_max_suggestions(),
            session_max_age_days: default_session_max_age_days(),
            llm: LlmSettings::default(),
            data: DataPaths::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_window == 0 {
            return Err(ConfigError::InvalidValue {
                field: "history_window".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_suggestions == 0 || self.max_suggestions > 5 {
            return Err(ConfigError::InvalidValue {
                field: "max_suggestions".to_string(),
                message: format!("must be 1..=5, got {}", self.max_suggestions),
            });
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                message: format!("must be between 0.0 and 2.0, got {}", self.llm.temperature),
            });
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.max_tokens".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.environment.is_production() && self.llm.endpoint.starts_with("http://127.") {
            tracing::warn!("production environment with a loopback llm endpoint");
        }
        Ok(())
    }
}

/// Load settings from files and environment.
///
/// Priority (highest to lowest):
/// 1. Environment variables (COACH_ prefix)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder = builder
            .add_source(File::with_name(&format!("config/{env_name}")).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("COACH")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings: Settings = serde_yaml::from_str("{}").unwrap();
        assert_eq!(settings.history_window, 6);
        assert_eq!(settings.max_suggestions, 3);
        assert_eq!(settings.session_max_age_days, 7);
        assert!((settings.llm.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(settings.llm.max_tokens, 300);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_bounds() {
        let mut settings: Settings = serde_yaml::from_str("{}").unwrap();

        settings.max_suggestions = 0;
        assert!(settings.validate().is_err());
        settings.max_suggestions = 3;

        settings.llm.temperature = 3.0;
        assert!(settings.validate().is_err());
        settings.llm.temperature = 0.3;

        settings.history_window = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_region_keys() {
        assert_eq!(Region::Us.as_key(), "us");
        assert_eq!(Region::All.as_key(), "all");
        let region: Region = serde_yaml::from_str("uk").unwrap();
        assert_eq!(region, Region::Uk);
    }
}
