//! reqwest-backed completion service
//!
//! Holds one client per [`ProviderKind`] and routes each request by an
//! exhaustive match. The request deadline is applied here, at the service
//! boundary; the engine itself owns no timeouts.

use async_trait::async_trait;
use std::time::Duration;

use super::{
    AnthropicClient, Completion, CompletionRequest, CompletionService, GeminiClient,
    OpenAiCompatibleClient, ProviderKind,
};
use crate::ai::credentials::Credentials;
use crate::ai::timeout::with_timeout;
use crate::config::LlmConfig;
use crate::constants::network::CONNECTION_TIMEOUT_SECS;
use crate::types::{PromptError, Result};

pub struct HttpCompletionService {
    openai: OpenAiCompatibleClient,
    groq: OpenAiCompatibleClient,
    anthropic: AnthropicClient,
    gemini: GeminiClient,
    timeout: Duration,
}

impl std::fmt::Debug for HttpCompletionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCompletionService")
            .field("openai", &self.openai.api_base())
            .field("groq", &self.groq.api_base())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpCompletionService {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECTION_TIMEOUT_SECS))
            .build()
            .map_err(|e| PromptError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        let endpoints = &config.endpoints;
        Ok(Self {
            openai: OpenAiCompatibleClient::new(
                ProviderKind::OpenAi,
                endpoints.openai.as_deref(),
                client.clone(),
            )?,
            groq: OpenAiCompatibleClient::new(
                ProviderKind::Groq,
                endpoints.groq.as_deref(),
                client.clone(),
            )?,
            anthropic: AnthropicClient::new(endpoints.anthropic.as_deref(), client.clone())?,
            gemini: GeminiClient::new(endpoints.gemini.as_deref(), client)?,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

#[async_trait]
impl CompletionService for HttpCompletionService {
    async fn complete(
        &self,
        request: &CompletionRequest,
        credentials: &Credentials,
    ) -> Result<Completion> {
        let api_key = credentials.require(request.provider, "this request")?;

        let call = async {
            match request.provider {
                ProviderKind::OpenAi => self.openai.send(api_key, request).await,
                ProviderKind::Groq => self.groq.send(api_key, request).await,
                ProviderKind::Anthropic => self.anthropic.send(api_key, request).await,
                ProviderKind::Gemini => self.gemini.send(api_key, request).await,
            }
        };

        let operation = format!("{} completion", request.provider.display_name());
        with_timeout(self.timeout, call, &operation).await
    }
}
