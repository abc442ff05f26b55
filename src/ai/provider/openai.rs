//! OpenAI-Compatible Chat Completions Client
//!
//! Serves both OpenAI and Groq: Groq exposes the same chat-completions
//! contract under its own base URL.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use super::{
    ChatMessage, Completion, CompletionRequest, ProviderKind, ResponseMetadata, ResponseTiming,
    TokenUsage, validate_endpoint,
};
use crate::types::{ErrorClassifier, PromptError, Result};

/// Chat-completions client for one OpenAI-compatible backend
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    provider: ProviderKind,
    api_base: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleClient {
    pub fn new(
        provider: ProviderKind,
        api_base: Option<&str>,
        client: reqwest::Client,
    ) -> Result<Self> {
        let api_base = validate_endpoint(
            api_base.unwrap_or(provider.default_api_base()),
            provider,
        )?;
        Ok(Self {
            provider,
            api_base,
            client,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn build_request(request: &CompletionRequest) -> ChatCompletionRequest<'_> {
        ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
        }
    }

    pub async fn send(&self, api_key: &SecretString, request: &CompletionRequest) -> Result<Completion> {
        info!(
            "Generating with {} (model: {}, temperature: {})",
            self.provider.display_name(),
            request.model,
            request.temperature
        );

        let start_time = Instant::now();
        let url = format!("{}/chat/completions", self.api_base);

        debug!("Sending request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .json(&Self::build_request(request))
            .send()
            .await
            .map_err(|e| {
                PromptError::Llm(ErrorClassifier::classify(
                    &format!("{} request failed: {}", self.provider.display_name(), e),
                    self.provider,
                ))
            })?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PromptError::Llm(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!(
                    "{} API error ({}): {}",
                    self.provider.display_name(),
                    status,
                    body
                ),
                self.provider,
            )));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            PromptError::LlmApi(format!(
                "Failed to parse {} response: {}",
                self.provider.display_name(),
                e
            ))
        })?;

        Ok(self.into_completion(body, &request.model, elapsed))
    }

    fn into_completion(
        &self,
        body: ChatCompletionResponse,
        model: &str,
        elapsed: std::time::Duration,
    ) -> Completion {
        let usage = body
            .usage
            .as_ref()
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        // A missing message body is an empty completion, not a transport error
        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Completion {
            text,
            usage,
            timing: ResponseTiming::from_duration(elapsed),
            metadata: ResponseMetadata {
                provider: self.provider,
                model: model.to_string(),
                raw_usage: body.usage.and_then(|u| serde_json::to_value(u).ok()),
            },
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct UsageInfo {
    prompt_tokens: u32,
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelConfig;

    fn client(provider: ProviderKind) -> OpenAiCompatibleClient {
        OpenAiCompatibleClient::new(provider, None, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn test_groq_uses_openai_compatible_base() {
        assert_eq!(
            client(ProviderKind::Groq).api_base(),
            "https://api.groq.com/openai/v1"
        );
        assert_eq!(
            client(ProviderKind::OpenAi).api_base(),
            "https://api.openai.com/v1"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let request = CompletionRequest::user_prompt("Write a haiku", &ModelConfig::system());
        let body = serde_json::to_value(OpenAiCompatibleClient::build_request(&request)).unwrap();

        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Write a haiku");
        assert_eq!(body["max_tokens"], 8192);
    }

    #[test]
    fn test_response_parsing_extracts_text_and_usage() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Hello"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#;
        let body: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        let completion = client(ProviderKind::Groq).into_completion(
            body,
            "llama-3.3-70b-versatile",
            std::time::Duration::from_millis(40),
        );

        assert_eq!(completion.text, "Hello");
        assert_eq!(completion.usage.total(), 15);
        assert_eq!(completion.metadata.provider, ProviderKind::Groq);
        assert_eq!(
            completion.metadata.raw_usage.unwrap()["total_tokens"],
            serde_json::json!(15)
        );
    }

    #[test]
    fn test_response_without_content_is_empty_text() {
        let raw = r#"{"choices": [{"message": {"content": null}}]}"#;
        let body: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        let completion = client(ProviderKind::OpenAi).into_completion(
            body,
            "gpt-4o",
            std::time::Duration::ZERO,
        );
        assert!(completion.text.is_empty());
        assert_eq!(completion.usage, TokenUsage::default());
    }
}
