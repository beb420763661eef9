//! Configuration loading and management for briefly.
//!
//! Loads settings from `briefly.toml` when one exists, with the API key taken
//! from the environment only.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the LLM provider credential
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

const CONFIG_FILE: &str = "briefly.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("{0} not found. Please check your .env file.")]
    MissingApiKey(&'static str),
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model identifier sent with every completion request
    pub model: String,
    /// Base URL of an OpenAI-compatible chat completions API
    pub base_url: String,
    /// Optional request timeout; unset means wait indefinitely
    pub timeout_secs: Option<u64>,
}

/// Content fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Skip TLS certificate validation when fetching web pages.
    ///
    /// Enabled by default so pages behind broken or self-signed certificates
    /// can still be summarised. Set to `false` to validate certificates.
    pub accept_invalid_certs: bool,
    /// Preferred caption language for YouTube transcripts
    pub transcript_language: String,
    /// Origin used to fetch YouTube watch pages
    pub youtube_base_url: String,
    /// Optional request timeout; unset means wait indefinitely
    pub timeout_secs: Option<u64>,
}

/// API keys (loaded from environment only)
#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    pub groq_key: Option<String>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(skip)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from the default location, falling back to defaults
    /// when no config file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from a specific path (environment not applied)
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Fill secrets from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.api.groq_key = lookup(API_KEY_VAR).filter(|key| !key.trim().is_empty());
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::home_dir()
            .map(|home| home.join(".config").join("briefly").join(CONFIG_FILE))
            .filter(|path| path.exists())
    }

    /// Get the API key for the LLM provider
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api
            .groq_key
            .as_deref()
            .ok_or(ConfigError::MissingApiKey(API_KEY_VAR))
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "deepseek-r1-distill-llama-70b".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            timeout_secs: None,
        }
    }
}

impl AgentConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            accept_invalid_certs: true,
            transcript_language: "en".to_string(),
            youtube_base_url: "https://www.youtube.com".to_string(),
            timeout_secs: None,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_original_behaviour() {
        let config = Config::default();
        assert_eq!(config.agent.model, "deepseek-r1-distill-llama-70b");
        assert!(config.fetch.accept_invalid_certs);
        assert!(config.agent.timeout().is_none());
        assert!(config.fetch.timeout().is_none());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[agent]\nmodel = \"llama-3.3-70b-versatile\"\n\n[fetch]\naccept_invalid_certs = false"
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.agent.model, "llama-3.3-70b-versatile");
        assert_eq!(config.agent.base_url, "https://api.groq.com/openai/v1");
        assert!(!config.fetch.accept_invalid_certs);
        assert_eq!(config.fetch.transcript_language, "en");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[agent\nmodel = ").unwrap();

        assert!(matches!(
            Config::load_from(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn missing_api_key_is_reported() {
        let mut config = Config::default();
        config.apply_env(|_| None);

        let err = config.api_key().unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut config = Config::default();
        config.apply_env(|_| Some("   ".to_string()));
        assert!(config.api_key().is_err());
    }

    #[test]
    fn api_key_read_from_lookup() {
        let mut config = Config::default();
        config.apply_env(|name| (name == API_KEY_VAR).then(|| "gsk_test".to_string()));
        assert_eq!(config.api_key().unwrap(), "gsk_test");
    }
}
