//! Google Gemini `generateContent` Client

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use super::{
    Completion, CompletionRequest, ProviderKind, ResponseMetadata, ResponseTiming, Role,
    TokenUsage, validate_endpoint,
};
use crate::types::{ErrorClassifier, PromptError, Result};

const PROVIDER: ProviderKind = ProviderKind::Gemini;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_base: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_base: Option<&str>, client: reqwest::Client) -> Result<Self> {
        let api_base = validate_endpoint(api_base.unwrap_or(PROVIDER.default_api_base()), PROVIDER)?;
        Ok(Self { api_base, client })
    }

    fn build_request(request: &CompletionRequest) -> GenerateContentRequest {
        let contents = request
            .messages
            .iter()
            .map(|m| Content {
                role: match m.role {
                    Role::Assistant => "model",
                    Role::User | Role::System => "user",
                },
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
            .collect();

        GenerateContentRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                top_p: request.top_p,
                top_k: request.top_k,
                max_output_tokens: request.max_tokens,
            },
        }
    }

    pub async fn send(&self, api_key: &SecretString, request: &CompletionRequest) -> Result<Completion> {
        info!(
            "Generating with Gemini (model: {}, temperature: {})",
            request.model, request.temperature
        );

        let start_time = Instant::now();
        let url = format!("{}/models/{}:generateContent", self.api_base, request.model);

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key.expose_secret())
            .json(&Self::build_request(request))
            .send()
            .await
            .map_err(|e| {
                PromptError::Llm(ErrorClassifier::classify(
                    &format!("Gemini request failed: {}", e),
                    PROVIDER,
                ))
            })?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PromptError::Llm(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Gemini API error ({}): {}", status, body),
                PROVIDER,
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| PromptError::LlmApi(format!("Failed to parse Gemini response: {}", e)))?;

        Ok(into_completion(body, &request.model, elapsed))
    }
}

fn into_completion(
    body: GenerateContentResponse,
    model: &str,
    elapsed: std::time::Duration,
) -> Completion {
    let usage = body
        .usage_metadata
        .as_ref()
        .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
        .unwrap_or_default();

    let text = body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    Completion {
        text,
        usage,
        timing: ResponseTiming::from_duration(elapsed),
        metadata: ResponseMetadata {
            provider: PROVIDER,
            model: model.to_string(),
            raw_usage: body.usage_metadata.and_then(|u| serde_json::to_value(u).ok()),
        },
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelConfig;

    #[test]
    fn test_request_uses_generation_config() {
        let mut model = ModelConfig::system();
        model.provider = ProviderKind::Gemini;
        model.model = "gemini-1.5-pro".to_string();
        let request = CompletionRequest::user_prompt("Explain", &model);
        let body = serde_json::to_value(GeminiClient::build_request(&request)).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Explain");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(body["generationConfig"]["topK"], 40);
    }

    #[test]
    fn test_parts_are_concatenated() {
        let raw = r#"{
            "candidates": [{"content": {"parts": [{"text": "Hello, "}, {"text": "world"}]}}],
            "usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 2, "totalTokenCount": 7}
        }"#;
        let body: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let completion = into_completion(body, "gemini-1.5-pro", std::time::Duration::ZERO);

        assert_eq!(completion.text, "Hello, world");
        assert_eq!(completion.usage.total(), 7);
    }

    #[test]
    fn test_missing_usage_defaults_to_zero() {
        let raw = r#"{"candidates": []}"#;
        let body: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let completion = into_completion(body, "gemini-1.5-pro", std::time::Duration::ZERO);
        assert!(completion.text.is_empty());
        assert_eq!(completion.usage.total(), 0);
        assert!(completion.metadata.raw_usage.is_none());
    }
}
