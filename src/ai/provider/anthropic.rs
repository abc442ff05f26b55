//! Anthropic Messages API Client

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use super::{
    ChatMessage, Completion, CompletionRequest, ProviderKind, ResponseMetadata, ResponseTiming,
    TokenUsage, validate_endpoint,
};
use crate::constants::network::ANTHROPIC_VERSION;
use crate::types::{ErrorClassifier, PromptError, Result};

const PROVIDER: ProviderKind = ProviderKind::Anthropic;

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    api_base: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(api_base: Option<&str>, client: reqwest::Client) -> Result<Self> {
        let api_base = validate_endpoint(api_base.unwrap_or(PROVIDER.default_api_base()), PROVIDER)?;
        Ok(Self { api_base, client })
    }

    fn build_request(request: &CompletionRequest) -> MessagesRequest<'_> {
        MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: &request.messages,
        }
    }

    pub async fn send(&self, api_key: &SecretString, request: &CompletionRequest) -> Result<Completion> {
        info!(
            "Generating with Anthropic (model: {}, temperature: {})",
            request.model, request.temperature
        );

        let start_time = Instant::now();
        let url = format!("{}/v1/messages", self.api_base);

        debug!("Sending request to Anthropic API");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&Self::build_request(request))
            .send()
            .await
            .map_err(|e| {
                PromptError::Llm(ErrorClassifier::classify(
                    &format!("Anthropic request failed: {}", e),
                    PROVIDER,
                ))
            })?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PromptError::Llm(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Anthropic API error ({}): {}", status, body),
                PROVIDER,
            )));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| PromptError::LlmApi(format!("Failed to parse Anthropic response: {}", e)))?;

        Ok(into_completion(body, &request.model, elapsed))
    }
}

fn into_completion(body: MessagesResponse, model: &str, elapsed: std::time::Duration) -> Completion {
    let usage = body
        .usage
        .as_ref()
        .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens))
        .unwrap_or_default();

    // Only a leading text block counts as the answer
    let text = match body.content.into_iter().next() {
        Some(ContentBlock::Text { text }) => text,
        _ => String::new(),
    };

    Completion {
        text,
        usage,
        timing: ResponseTiming::from_duration(elapsed),
        metadata: ResponseMetadata {
            provider: PROVIDER,
            model: model.to_string(),
            raw_usage: body.usage.and_then(|u| serde_json::to_value(u).ok()),
        },
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Serialize, Deserialize)]
struct UsageInfo {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelConfig;

    #[test]
    fn test_request_body_shape() {
        let mut model = ModelConfig::system();
        model.provider = ProviderKind::Anthropic;
        model.model = "claude-3-5-sonnet-latest".to_string();
        let request = CompletionRequest::user_prompt("Summarize", &model);
        let body = serde_json::to_value(AnthropicClient::build_request(&request)).unwrap();

        assert_eq!(body["model"], "claude-3-5-sonnet-latest");
        assert_eq!(body["messages"][0]["content"], "Summarize");
        assert!(body.get("top_p").is_none());
    }

    #[test]
    fn test_text_block_and_usage() {
        let raw = r#"{
            "content": [{"type": "text", "text": "Done."}],
            "usage": {"input_tokens": 20, "output_tokens": 4}
        }"#;
        let body: MessagesResponse = serde_json::from_str(raw).unwrap();
        let completion = into_completion(body, "claude", std::time::Duration::ZERO);

        assert_eq!(completion.text, "Done.");
        assert_eq!(completion.usage.total(), 24);
        assert_eq!(completion.metadata.provider, ProviderKind::Anthropic);
    }

    #[test]
    fn test_non_text_leading_block_yields_empty_text() {
        let raw = r#"{"content": [{"type": "tool_use", "id": "x", "name": "y", "input": {}}]}"#;
        let body: MessagesResponse = serde_json::from_str(raw).unwrap();
        let completion = into_completion(body, "claude", std::time::Duration::ZERO);
        assert!(completion.text.is_empty());
    }
}
