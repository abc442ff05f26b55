//! Prompt execution with the user's model

use tracing::info;

use super::PromptEngine;
use crate::ai::credentials::Credentials;
use crate::ai::provider::{Completion, CompletionRequest};
use crate::model::{ModelConfig, UsageRecord};
use crate::types::Result;

impl PromptEngine {
    /// Send `prompt` as a single user message with `model`
    ///
    /// The config is validated and the chosen provider's credential checked
    /// before anything is sent.
    pub async fn run_prompt(
        &self,
        prompt: &str,
        model: &ModelConfig,
        credentials: &Credentials,
    ) -> Result<Completion> {
        model.validate()?;
        credentials.require(model.provider, "running the prompt")?;

        let completion = self
            .complete(CompletionRequest::user_prompt(prompt, model), credentials)
            .await?;
        info!(
            "Prompt executed with {} ({} tokens, {}ms)",
            model.model,
            completion.usage.total(),
            completion.timing.total_ms
        );
        self.record_usage(UsageRecord::from_completion(&completion));
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::ProviderKind;
    use crate::engine::testing::{CollectingSink, ScriptedService, groq_credentials};
    use crate::types::PromptError;

    fn anthropic_model() -> ModelConfig {
        ModelConfig {
            provider: ProviderKind::Anthropic,
            model: "claude-3-5-haiku-latest".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_run_honors_user_model() {
        let service = ScriptedService::replying("The answer");
        let sink = CollectingSink::new();
        let engine = PromptEngine::new(service.clone()).with_events(sink.clone());
        let credentials = Credentials::new().with_key(ProviderKind::Anthropic, "sk-ant");

        let completion = engine
            .run_prompt("Question", &anthropic_model(), &credentials)
            .await
            .unwrap();
        assert_eq!(completion.text, "The answer");
        assert_eq!(service.calls()[0].provider, ProviderKind::Anthropic);
        assert_eq!(service.calls()[0].max_tokens, 8000);
        assert_eq!(sink.usage()[0].provider, ProviderKind::Anthropic);
    }

    #[tokio::test]
    async fn test_run_requires_chosen_provider_key() {
        let service = ScriptedService::replying("unused");
        let engine = PromptEngine::new(service.clone());
        let err = engine
            .run_prompt("Question", &anthropic_model(), &groq_credentials())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Anthropic API key is required"));
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_run_validates_model_first() {
        let engine = PromptEngine::new(ScriptedService::replying("unused"));
        let model = ModelConfig {
            temperature: 3.0,
            ..Default::default()
        };
        let err = engine
            .run_prompt("Question", &model, &groq_credentials())
            .await
            .unwrap_err();
        assert!(matches!(err, PromptError::Validation(_)));
    }
}
