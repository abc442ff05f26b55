//! Completion Provider Abstraction
//!
//! Every backend is reached through the [`CompletionService`] trait and
//! returns a [`Completion`] with generated text and token usage.
//! The backend set is closed: [`ProviderKind`] enumerates it and the HTTP
//! service dispatches on it with an exhaustive match.
//!
//! ## Modules
//!
//! - `openai`: OpenAI-compatible chat completions (OpenAI, Groq)
//! - `anthropic`: Anthropic messages API
//! - `gemini`: Google Gemini `generateContent`
//! - `http`: reqwest-backed [`CompletionService`]

mod anthropic;
mod gemini;
mod http;
mod openai;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use http::HttpCompletionService;
pub use openai::OpenAiCompatibleClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::ai::credentials::Credentials;
use crate::model::ModelConfig;
use crate::types::{PromptError, Result};

// =============================================================================
// Provider Kind
// =============================================================================

/// Supported completion backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    #[default]
    Groq,
    Anthropic,
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::OpenAi,
        ProviderKind::Groq,
        ProviderKind::Anthropic,
        ProviderKind::Gemini,
    ];

    /// Stable identifier used in config files and stored records
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Groq => "groq",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }

    /// Human-readable name for messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Groq => "Groq",
            Self::Anthropic => "Anthropic",
            Self::Gemini => "Google Gemini",
        }
    }

    /// Environment variable holding this provider's API key
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Groq => "GROQ_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    /// Public API base URL
    pub fn default_api_base(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::Anthropic => "https://api.anthropic.com",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "groq" => Ok(Self::Groq),
            "anthropic" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            _ => Err(format!(
                "Unknown provider: {}. Supported: openai, groq, anthropic, gemini",
                s
            )),
        }
    }
}

// =============================================================================
// Request / Response
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single completion call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub provider: ProviderKind,
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// One user-role message carrying the fully assembled prompt
    pub fn user_prompt(prompt: &str, model: &ModelConfig) -> Self {
        Self {
            provider: model.provider,
            model: model.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: model.temperature,
            top_p: model.top_p,
            top_k: model.top_k,
            max_tokens: model.max_tokens,
        }
    }

    /// Override the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Generated text plus usage metrics
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
    pub timing: ResponseTiming,
    pub metadata: ResponseMetadata,
}

/// Token usage metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens (prompt)
    pub input_tokens: u32,
    /// Output tokens (response)
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Total tokens used (input + output), saturating at `u32::MAX`
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Default)]
pub struct ResponseTiming {
    /// Total response time in milliseconds (wall clock)
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Response metadata
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    pub provider: ProviderKind,
    pub model: String,
    /// Provider-native usage block, kept verbatim for the usage record
    pub raw_usage: Option<Value>,
}

// =============================================================================
// Completion Service
// =============================================================================

/// Uniform text-completion capability
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send one request. Fails with a message naming the provider.
    async fn complete(
        &self,
        request: &CompletionRequest,
        credentials: &Credentials,
    ) -> Result<Completion>;
}

/// Shared completion service for the engine
pub type SharedCompletionService = Arc<dyn CompletionService>;

/// Validate an API base URL
///
/// Only http/https are accepted. Plain http to a remote host is allowed but
/// warned about since the API key travels in a header.
pub(crate) fn validate_endpoint(endpoint: &str, provider: ProviderKind) -> Result<String> {
    let url = url::Url::parse(endpoint).map_err(|e| {
        PromptError::Config(format!(
            "Invalid {} endpoint URL '{}': {}",
            provider.display_name(),
            endpoint,
            e
        ))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(PromptError::Config(format!(
            "{} endpoint must use http or https scheme, got: {}",
            provider.display_name(),
            url.scheme()
        )));
    }

    if url.scheme() == "http"
        && let Some(host) = url.host_str()
        && !matches!(host, "localhost" | "127.0.0.1" | "[::1]")
    {
        warn!(
            "{} endpoint {} is not using https. API keys will be sent unencrypted.",
            provider.display_name(),
            host
        );
    }

    let mut result = url.to_string();
    if result.ends_with('/') {
        result.pop();
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_round_trip_str() {
        for provider in ProviderKind::ALL {
            assert_eq!(provider.as_str().parse::<ProviderKind>(), Ok(provider));
        }
        assert!("mistral".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_provider_kind_serde_lowercase() {
        let json = serde_json::to_string(&ProviderKind::OpenAi).unwrap();
        assert_eq!(json, "\"openai\"");
        let parsed: ProviderKind = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(parsed, ProviderKind::Gemini);
    }

    #[test]
    fn test_user_prompt_request_carries_model_config() {
        let model = ModelConfig::system();
        let request = CompletionRequest::user_prompt("hello", &model);
        assert_eq!(request.provider, ProviderKind::Groq);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert_eq!(request.max_tokens, model.max_tokens);
    }

    #[test]
    fn test_validate_endpoint_strips_trailing_slash() {
        let url = validate_endpoint("https://api.groq.com/openai/v1/", ProviderKind::Groq).unwrap();
        assert_eq!(url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_validate_endpoint_rejects_other_schemes() {
        assert!(validate_endpoint("ftp://example.com", ProviderKind::OpenAi).is_err());
        assert!(validate_endpoint("not a url", ProviderKind::OpenAi).is_err());
    }

    #[test]
    fn test_token_usage_total() {
        assert_eq!(TokenUsage::new(100, 50).total(), 150);
        assert_eq!(TokenUsage::new(u32::MAX, 1).total(), u32::MAX);
    }
}
