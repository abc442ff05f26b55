//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/promptcopilot/) and project (.promptcopilot/)
//! level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::network::DEFAULT_TIMEOUT_SECS;
use crate::constants::storage::{DATABASE_FILE, PROJECT_DIR};
use crate::engine::DEFAULT_VARIANT_CONCURRENCY;
use crate::model::ModelConfig;
use crate::types::{PromptError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Completion service settings
    pub llm: LlmConfig,

    /// Model configuration of a new prompt
    pub defaults: ModelConfig,

    /// Where API keys come from
    pub credentials: CredentialsConfig,

    /// History and usage persistence
    pub storage: StorageConfig,

    /// Template catalog source
    pub catalog: CatalogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            defaults: ModelConfig::default(),
            credentials: CredentialsConfig::default(),
            storage: StorageConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `PromptError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.llm.timeout_secs == 0 {
            return Err(PromptError::Config(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.variant_concurrency == 0 {
            return Err(PromptError::Config(
                "llm.variant_concurrency must be at least 1".to_string(),
            ));
        }

        self.defaults
            .validate()
            .map_err(|e| PromptError::Config(format!("defaults: {}", e)))?;

        if self.storage.enabled && self.storage.database.as_os_str().is_empty() {
            return Err(PromptError::Config(
                "storage.database must be set when storage is enabled".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Request timeout in seconds, applied per completion call
    pub timeout_secs: u64,

    /// APE rewrites in flight at once (1 = one after another)
    pub variant_concurrency: usize,

    /// Base URL overrides
    pub endpoints: EndpointConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            variant_concurrency: DEFAULT_VARIANT_CONCURRENCY,
            endpoints: EndpointConfig::default(),
        }
    }
}

/// Per-provider API base overrides; `None` uses the public endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groq: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini: Option<String>,
}

// =============================================================================
// Credentials Configuration
// =============================================================================

/// Custom API keys. Keys are read from config files and the environment
/// but never written back out.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Use the keys below instead of `<PROVIDER>_API_KEY` variables
    pub use_custom_keys: bool,

    #[serde(skip_serializing)]
    pub openai_key: Option<String>,
    #[serde(skip_serializing)]
    pub groq_key: Option<String>,
    #[serde(skip_serializing)]
    pub anthropic_key: Option<String>,
    #[serde(skip_serializing)]
    pub google_key: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("CredentialsConfig")
            .field("use_custom_keys", &self.use_custom_keys)
            .field("openai_key", &redact(&self.openai_key))
            .field("groq_key", &redact(&self.groq_key))
            .field("anthropic_key", &redact(&self.anthropic_key))
            .field("google_key", &redact(&self.google_key))
            .finish()
    }
}

// =============================================================================
// Storage Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Record prompt history and usage
    pub enabled: bool,

    /// SQLite database file
    pub database: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            database: PathBuf::from(PROJECT_DIR).join(DATABASE_FILE),
        }
    }
}

// =============================================================================
// Catalog Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON catalog replacing the built-in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::ProviderKind;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.variant_concurrency, DEFAULT_VARIANT_CONCURRENCY);
        assert_eq!(config.defaults.provider, ProviderKind::Groq);
        assert!(config.storage.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.llm.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(PromptError::Config(_))));
    }

    #[test]
    fn test_invalid_default_model_rejected() {
        let mut config = Config::default();
        config.defaults.temperature = 3.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("defaults"));
    }

    #[test]
    fn test_custom_keys_never_serialized() {
        let mut config = Config::default();
        config.credentials.use_custom_keys = true;
        config.credentials.groq_key = Some("gsk-secret".to_string());

        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(rendered.contains("use_custom_keys = true"));
        assert!(!rendered.contains("gsk-secret"));
        assert!(!format!("{:?}", config).contains("gsk-secret"));
    }
}
