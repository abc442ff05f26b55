//! AI-assisted prompt drafting

use tracing::{info, warn};

use super::{PromptEngine, compile, meta};
use crate::ai::credentials::Credentials;
use crate::ai::provider::CompletionRequest;
use crate::model::{PromptConfig, UsageRecord};
use crate::types::{PromptError, Result};

/// A drafted prompt and the usage it cost
#[derive(Debug, Clone)]
pub struct GeneratedPrompt {
    pub prompt: String,
    pub usage: UsageRecord,
}

impl GeneratedPrompt {
    /// True when the draft came from the compiler instead of the model
    pub fn is_fallback(&self) -> bool {
        self.usage.is_fallback()
    }
}

impl PromptEngine {
    /// Draft an optimized prompt for `config` with the system model
    ///
    /// Fails only when the system provider has no credential. Any other
    /// failure, including an empty answer, falls back to [`compile`] with a
    /// zero-token usage record carrying the error message.
    pub async fn generate(
        &self,
        config: &PromptConfig,
        credentials: &Credentials,
    ) -> Result<GeneratedPrompt> {
        credentials.require(self.system_model.provider, "AI generation")?;

        let request =
            CompletionRequest::user_prompt(&meta::generation_prompt(config), &self.system_model);

        let drafted = self
            .complete(request, credentials)
            .await
            .and_then(|completion| {
                let prompt = completion.text.trim().to_string();
                if prompt.is_empty() {
                    return Err(PromptError::LlmApi(format!(
                        "{} returned an empty prompt",
                        completion.metadata.provider.display_name()
                    )));
                }
                Ok(GeneratedPrompt {
                    prompt,
                    usage: UsageRecord::from_completion(&completion),
                })
            });

        let generated = match drafted {
            Ok(generated) => {
                info!(
                    "Drafted prompt for '{}' ({} tokens)",
                    config.use_case.name, generated.usage.total_tokens
                );
                generated
            }
            Err(e) => {
                warn!("AI prompt generation failed, using template: {}", e);
                GeneratedPrompt {
                    prompt: compile(config),
                    usage: UsageRecord::fallback(&self.system_model, &e.to_string()),
                }
            }
        };

        self.record_usage(generated.usage.clone());
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::ProviderKind;
    use crate::engine::testing::{
        CollectingSink, ScriptedService, default_config, groq_credentials,
    };

    #[tokio::test]
    async fn test_generate_uses_system_model_and_trims() {
        let service = ScriptedService::replying("  Drafted prompt.\n");
        let sink = CollectingSink::new();
        let engine = PromptEngine::new(service.clone()).with_events(sink.clone());

        let mut config = default_config();
        config.model_config.provider = ProviderKind::OpenAi;
        config.model_config.model = "gpt-4o-mini".to_string();

        let generated = engine.generate(&config, &groq_credentials()).await.unwrap();
        assert_eq!(generated.prompt, "Drafted prompt.");
        assert!(!generated.is_fallback());

        let calls = service.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].provider, ProviderKind::Groq);
        assert_eq!(calls[0].model, "llama-3.3-70b-versatile");
        assert_eq!(calls[0].max_tokens, 8192);
        assert!(calls[0].messages[0].content.contains(&config.use_case.name));

        let usage = sink.usage();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].total_tokens, 15);
    }

    #[tokio::test]
    async fn test_missing_system_credential_is_an_error() {
        let service = ScriptedService::replying("unused");
        let engine = PromptEngine::new(service.clone());
        let credentials = Credentials::new().with_key(ProviderKind::OpenAi, "sk");

        let err = engine
            .generate(&default_config(), &credentials)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PromptError::MissingCredential {
                provider: ProviderKind::Groq,
                ..
            }
        ));
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_falls_back_to_compiler() {
        let sink = CollectingSink::new();
        let engine =
            PromptEngine::new(ScriptedService::failing("rate limited")).with_events(sink.clone());
        let config = default_config();

        let generated = engine.generate(&config, &groq_credentials()).await.unwrap();
        assert_eq!(generated.prompt, compile(&config));
        assert!(generated.is_fallback());
        assert_eq!(generated.usage.total_tokens, 0);
        assert!(
            generated.usage.metadata["error"]
                .as_str()
                .unwrap()
                .contains("rate limited")
        );

        let usage = sink.usage();
        assert_eq!(usage.len(), 1);
        assert!(usage[0].is_fallback());
    }

    #[tokio::test]
    async fn test_blank_answer_falls_back() {
        let engine = PromptEngine::new(ScriptedService::replying("   \n"));
        let config = default_config();
        let generated = engine.generate(&config, &groq_credentials()).await.unwrap();
        assert_eq!(generated.prompt, compile(&config));
        assert!(generated.is_fallback());
    }
}
