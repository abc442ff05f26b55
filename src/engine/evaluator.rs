//! AI grading of prompt text

use serde_json::Value;
use tracing::debug;

use super::{PromptEngine, meta};
use crate::ai::credentials::Credentials;
use crate::ai::json::extract_json_from_response;
use crate::ai::provider::{CompletionRequest, ProviderKind};
use crate::constants::system_model::EVALUATION_TEMPERATURE;
use crate::model::{PromptScore, UsageRecord};
use crate::types::{ErrorCategory, LlmError, PromptError, Result};

#[derive(Debug, Clone)]
pub struct EvaluatedPrompt {
    pub score: PromptScore,
    pub usage: UsageRecord,
}

impl PromptEngine {
    /// Grade `prompt` with the system model at temperature 0
    ///
    /// Axis values are clamped to their caps and the total recomputed. An
    /// answer without the three numeric fields is a parse failure; no score
    /// is made up.
    pub async fn evaluate(
        &self,
        prompt: &str,
        credentials: &Credentials,
    ) -> Result<EvaluatedPrompt> {
        credentials.require(self.system_model.provider, "prompt scoring")?;

        let request =
            CompletionRequest::user_prompt(&meta::evaluation_prompt(prompt), &self.system_model)
                .temperature(EVALUATION_TEMPERATURE);
        let completion = self.complete(request, credentials).await?;
        let usage = UsageRecord::from_completion(&completion);
        self.record_usage(usage.clone());

        let score = parse_score(&completion.text, completion.metadata.provider)?;
        debug!("AI evaluation: {}", score);
        Ok(EvaluatedPrompt { score, usage })
    }
}

fn parse_score(text: &str, provider: ProviderKind) -> Result<PromptScore> {
    let parse_error = |message: String| {
        PromptError::Llm(LlmError::with_provider(
            ErrorCategory::ParseError,
            message,
            provider,
        ))
    };

    let value = extract_json_from_response(text)
        .map_err(|e| parse_error(format!("Unreadable score: {}", e)))?;

    let axis = |name: &str| -> Result<u32> {
        value
            .get(name)
            .and_then(Value::as_f64)
            .filter(|n| n.is_finite())
            .map(|n| n.round().max(0.0) as u32)
            .ok_or_else(|| parse_error(format!("Score is missing numeric '{}'", name)))
    };

    Ok(PromptScore::new(
        axis("clarity")?,
        axis("specificity")?,
        axis("structure")?,
    ))
}
