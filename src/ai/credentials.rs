//! Provider Credentials
//!
//! [`Credentials`] is a read-only bag of optional API keys, one per
//! provider. Keys are held as [`SecretString`] and redacted in debug output.
//!
//! Where keys come from is a separate decision, made by [`CredentialSource`]:
//! either the process environment or the user's custom keys from the
//! configuration. The engine only ever receives the resolved `Credentials`.

use secrecy::SecretString;
use std::collections::HashMap;

use crate::ai::provider::ProviderKind;
use crate::config::CredentialsConfig;
use crate::types::{PromptError, Result};

/// Resolved API keys per provider
#[derive(Clone, Default)]
pub struct Credentials {
    keys: HashMap<ProviderKind, SecretString>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for provider in ProviderKind::ALL {
            if self.keys.contains_key(&provider) {
                map.entry(&provider.as_str(), &"[REDACTED]");
            }
        }
        map.finish()
    }
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key. Blank keys are treated as absent.
    pub fn with_key(mut self, provider: ProviderKind, key: impl Into<String>) -> Self {
        self.set(provider, key);
        self
    }

    fn set(&mut self, provider: ProviderKind, key: impl Into<String>) {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            self.keys.remove(&provider);
        } else {
            self.keys
                .insert(provider, SecretString::from(trimmed.to_string()));
        }
    }

    pub fn get(&self, provider: ProviderKind) -> Option<&SecretString> {
        self.keys.get(&provider)
    }

    pub fn has(&self, provider: ProviderKind) -> bool {
        self.keys.contains_key(&provider)
    }

    /// Key for `provider`, or a `MissingCredential` error naming `operation`
    pub fn require(&self, provider: ProviderKind, operation: &str) -> Result<&SecretString> {
        self.get(provider)
            .ok_or_else(|| PromptError::missing_credential(provider, operation))
    }

    /// Providers that currently have a key
    pub fn configured(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|p| self.has(*p))
            .collect()
    }
}

/// Strategy for resolving credentials
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Read `<PROVIDER>_API_KEY` environment variables
    Environment,
    /// Use keys the user entered in settings
    Custom(Credentials),
}

impl CredentialSource {
    /// Pick the strategy selected by the `use_custom_keys` setting
    pub fn from_config(config: &CredentialsConfig) -> Self {
        if !config.use_custom_keys {
            return Self::Environment;
        }

        let mut credentials = Credentials::new();
        let custom = [
            (ProviderKind::OpenAi, &config.openai_key),
            (ProviderKind::Groq, &config.groq_key),
            (ProviderKind::Anthropic, &config.anthropic_key),
            (ProviderKind::Gemini, &config.google_key),
        ];
        for (provider, key) in custom {
            if let Some(key) = key {
                credentials.set(provider, key.as_str());
            }
        }
        Self::Custom(credentials)
    }

    pub fn resolve(&self) -> Credentials {
        match self {
            Self::Environment => Self::resolve_with(|name| std::env::var(name).ok()),
            Self::Custom(credentials) => credentials.clone(),
        }
    }

    fn resolve_with(lookup: impl Fn(&str) -> Option<String>) -> Credentials {
        let mut credentials = Credentials::new();
        for provider in ProviderKind::ALL {
            let value = lookup(provider.env_var()).or_else(|| match provider {
                ProviderKind::Gemini => lookup("GOOGLE_API_KEY"),
                _ => None,
            });
            if let Some(value) = value {
                credentials.set(provider, value);
            }
        }
        credentials
    }
}
