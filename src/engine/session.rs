//! Generation Session
//!
//! Caller-side orchestration of one user's generate / APE actions:
//!
//! 1. The chosen provider must have a credential (checked before anything)
//! 2. Only one action runs at a time; a second one gets [`PromptError::Busy`]
//! 3. `generate` drafts, records the prompt in history, then scores it with
//!    the AI evaluator. A scoring failure keeps the prompt and clears the score.
//! 4. `ape` replaces the stored variant batch wholesale

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::warn;

use super::{EngineEvent, PromptEngine};
use crate::ai::credentials::Credentials;
use crate::model::{ApeVariant, PromptConfig, PromptRecord, PromptScore, UsageRecord};
use crate::types::{PromptError, Result};

/// Result of a session `generate`
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub prompt: String,
    pub usage: UsageRecord,
    pub score: Option<PromptScore>,
    /// Why `score` is missing, when scoring failed
    pub score_error: Option<String>,
}

pub struct GenerationSession {
    engine: Arc<PromptEngine>,
    in_flight: AtomicBool,
    variants: RwLock<Vec<ApeVariant>>,
}

/// Clears the in-flight flag on every exit path
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl GenerationSession {
    pub fn new(engine: Arc<PromptEngine>) -> Self {
        Self {
            engine,
            in_flight: AtomicBool::new(false),
            variants: RwLock::new(Vec::new()),
        }
    }

    pub fn engine(&self) -> &PromptEngine {
        &self.engine
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PromptError::Busy)?;
        Ok(InFlight(&self.in_flight))
    }

    /// Draft a prompt for `config`, keep it in history, then score it
    pub async fn generate(
        &self,
        config: &PromptConfig,
        credentials: &Credentials,
    ) -> Result<GenerationOutcome> {
        let _in_flight = self.begin()?;
        credentials.require(config.model_config.provider, "generation")?;
        config.validate()?;

        let generated = self.engine.generate(config, credentials).await?;
        self.engine.emit(EngineEvent::PromptGenerated(PromptRecord::single(
            config,
            generated.prompt.as_str(),
        )));

        let (score, score_error) = match self.engine.evaluate(&generated.prompt, credentials).await
        {
            Ok(evaluated) => (Some(evaluated.score), None),
            Err(e) => {
                warn!("Failed to score prompt: {}", e);
                (None, Some(e.to_string()))
            }
        };

        Ok(GenerationOutcome {
            prompt: generated.prompt,
            usage: generated.usage,
            score,
            score_error,
        })
    }

    /// Generate variants and make them the session's current batch
    pub async fn ape(
        &self,
        config: &PromptConfig,
        credentials: &Credentials,
    ) -> Result<Vec<ApeVariant>> {
        let _in_flight = self.begin()?;
        credentials.require(config.model_config.provider, "APE")?;

        let variants = self.engine.generate_variants(config, credentials).await?;
        *self.variants.write().await = variants.clone();
        Ok(variants)
    }

    /// Batch from the last successful `ape`
    pub async fn variants(&self) -> Vec<ApeVariant> {
        self.variants.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{
        Completion, CompletionRequest, CompletionService, ProviderKind,
    };
    use crate::engine::testing::{
        CollectingSink, ScriptedService, default_config, groq_credentials, upstream_error,
    };
    use async_trait::async_trait;
    use tokio::sync::Notify;

    const SCORE_JSON: &str = r#"{"clarity": 10, "specificity": 10, "structure": 10}"#;

    fn is_evaluation(req: &CompletionRequest) -> bool {
        req.messages[0].content.starts_with("You are a professional prompt engineer.")
    }

    fn session(service: Arc<ScriptedService>, sink: Arc<CollectingSink>) -> GenerationSession {
        GenerationSession::new(Arc::new(PromptEngine::new(service).with_events(sink)))
    }

    #[tokio::test]
    async fn test_generate_drafts_records_and_scores() {
        let service = ScriptedService::new(|req| {
            Ok(if is_evaluation(req) { SCORE_JSON.to_string() } else { "Drafted".to_string() })
        });
        let sink = CollectingSink::new();
        let session = session(service, sink.clone());

        let outcome = session
            .generate(&default_config(), &groq_credentials())
            .await
            .unwrap();
        assert_eq!(outcome.prompt, "Drafted");
        assert_eq!(outcome.score.unwrap().total(), 30);
        assert!(outcome.score_error.is_none());

        let records = sink.prompts();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].final_prompt, "Drafted");
        // Draft and evaluation usage
        assert_eq!(sink.usage().len(), 2);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_scoring_failure_keeps_prompt() {
        let service = ScriptedService::new(|req| {
            if is_evaluation(req) {
                Err(upstream_error("scoring down", req.provider))
            } else {
                Ok("Drafted".to_string())
            }
        });
        let session = session(service, CollectingSink::new());

        let outcome = session
            .generate(&default_config(), &groq_credentials())
            .await
            .unwrap();
        assert_eq!(outcome.prompt, "Drafted");
        assert!(outcome.score.is_none());
        assert!(outcome.score_error.unwrap().contains("scoring down"));
    }

    #[tokio::test]
    async fn test_chosen_provider_gate_runs_first() {
        let service = ScriptedService::replying("unused");
        let session = session(service.clone(), CollectingSink::new());
        let mut config = default_config();
        config.model_config.provider = ProviderKind::Anthropic;

        let err = session
            .generate(&config, &groq_credentials())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PromptError::MissingCredential {
                provider: ProviderKind::Anthropic,
                ..
            }
        ));
        assert!(service.calls().is_empty());
        // Guard released on the error path
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_ape_replaces_batch() {
        let session = session(ScriptedService::replying("Variant"), CollectingSink::new());
        assert!(session.variants().await.is_empty());

        let first = session
            .ape(&default_config(), &groq_credentials())
            .await
            .unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(session.variants().await, first);
    }

    /// Blocks every call until released
    struct GatedService {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl CompletionService for GatedService {
        async fn complete(
            &self,
            request: &CompletionRequest,
            credentials: &Credentials,
        ) -> Result<Completion> {
            self.entered.notify_one();
            self.release.notified().await;
            ScriptedService::replying(SCORE_JSON)
                .complete(request, credentials)
                .await
        }
    }

    #[tokio::test]
    async fn test_second_action_while_in_flight_is_busy() {
        let service = Arc::new(GatedService {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let engine = PromptEngine::new(service.clone()).with_variant_concurrency(1);
        let session = Arc::new(GenerationSession::new(Arc::new(engine)));
        let credentials = groq_credentials();
        let config = default_config();

        let running = {
            let session = Arc::clone(&session);
            let credentials = credentials.clone();
            let config = config.clone();
            tokio::spawn(async move { session.generate(&config, &credentials).await })
        };

        service.entered.notified().await;
        assert!(session.is_busy());
        let err = session.ape(&config, &credentials).await.unwrap_err();
        assert!(matches!(err, PromptError::Busy));

        // Draft, then evaluation
        service.release.notify_one();
        service.entered.notified().await;
        service.release.notify_one();

        let outcome = running.await.unwrap().unwrap();
        assert_eq!(outcome.score.unwrap().total(), 30);
        assert!(!session.is_busy());
    }
}
