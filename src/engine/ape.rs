//! Automatic Prompt Engineering: stylistic rewrites of a compiled prompt

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{PromptEngine, compile, meta, score};
use crate::ai::credentials::Credentials;
use crate::ai::provider::CompletionRequest;
use crate::model::{ApeVariant, PromptConfig, UsageRecord, VariantMeta};
use crate::types::Result;

/// Named rewrite instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantStyle {
    pub name: String,
    pub instruction: String,
}

impl VariantStyle {
    pub fn new(name: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instruction: instruction.into(),
        }
    }

    /// Comprehensive, reasoning and structured rewrites
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                "Mega Prompt (Comprehensive)",
                "Rewrite this prompt into a massive, comprehensive 'Mega Prompt' (50+ lines). Include detailed persona, context, constraints, and step-by-step instructions. Be exhaustive.",
            ),
            Self::new(
                "Chain of Thought (Reasoning)",
                "Rewrite this prompt to strictly enforce Chain of Thought reasoning. The model must explain its logic step-by-step before answering.",
            ),
            Self::new(
                "Clear & Structured",
                "Optimize this prompt for maximum clarity and structure. Use markdown headers and bullet points to organize instructions.",
            ),
        ]
    }
}

const FALLBACK_VARIATION: &str = "Fallback";
const FALLBACK_TECHNIQUE: &str = "Error";

impl PromptEngine {
    /// One variant per configured style, in style order
    ///
    /// A failed rewrite yields a fallback variant built from the compiled
    /// prompt; only a missing system credential fails the whole batch.
    pub async fn generate_variants(
        &self,
        config: &PromptConfig,
        credentials: &Credentials,
    ) -> Result<Vec<ApeVariant>> {
        credentials.require(self.system_model.provider, "APE variant generation")?;

        let base = compile(config);
        let base_score = score(&base, config);

        let variants: Vec<ApeVariant> = stream::iter(self.styles.iter().enumerate())
            .map(|(index, style)| {
                let base = base.as_str();
                async move {
                    match self.rewrite(base, style, credentials).await {
                        Ok(prompt) => ApeVariant {
                            id: format!("variant-{}", index),
                            score: score(&prompt, config),
                            prompt,
                            meta: VariantMeta {
                                variation: style.name.clone(),
                                technique: config.technique.name.clone(),
                            },
                        },
                        Err(e) => {
                            warn!("Failed to generate variant {} ({}): {}", index, style.name, e);
                            ApeVariant {
                                id: format!("variant-{}-fallback", index),
                                prompt: format!(
                                    "{}\n\n[Failed to generate AI variant: {}]",
                                    base, style.name
                                ),
                                score: base_score,
                                meta: VariantMeta {
                                    variation: FALLBACK_VARIATION.to_string(),
                                    technique: FALLBACK_TECHNIQUE.to_string(),
                                },
                            }
                        }
                    }
                }
            })
            .buffered(self.variant_concurrency)
            .collect()
            .await;

        info!(
            "Generated {} variants ({} fallback)",
            variants.len(),
            variants.iter().filter(|v| v.is_fallback()).count()
        );
        Ok(variants)
    }

    async fn rewrite(
        &self,
        base: &str,
        style: &VariantStyle,
        credentials: &Credentials,
    ) -> Result<String> {
        let request = CompletionRequest::user_prompt(
            &meta::variant_prompt(&style.instruction, base),
            &self.system_model,
        );
        let completion = self.complete(request, credentials).await?;
        self.record_usage(UsageRecord::from_completion(&completion));
        Ok(completion.text.trim().to_string())
    }
}
