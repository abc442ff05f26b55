//! Prompt Engine
//!
//! Compiles, drafts, scores and refines prompts.
//!
//! ## Components
//!
//! - [`compile`]: deterministic template substitution (pure)
//! - [`score`]: heuristic clarity/specificity/structure grading (pure)
//! - [`PromptEngine::generate`]: AI-drafted prompt with compiler fallback
//! - [`PromptEngine::generate_variants`]: APE rewrites, one per style
//! - [`PromptEngine::execute_chain`]: sequential steps with output piping
//! - [`PromptEngine::evaluate`]: AI grading of a prompt
//! - [`PromptEngine::run_prompt`]: executes a prompt with the user's model
//! - [`GenerationSession`]: caller-side guard around one generation flow
//!
//! Drafting, variants and evaluation always use the system model
//! ([`ModelConfig::system`]); only prompt execution honors the user's
//! model choice. The engine owns no timeouts and performs no storage I/O:
//! usage and history leave through the [`EventSink`].

mod ape;
mod chain;
mod compiler;
mod evaluator;
mod events;
mod generator;
mod meta;
mod runner;
mod scorer;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use ape::VariantStyle;
pub use chain::{ChainObserver, ChainOutcome, NoopObserver, substitute_step_outputs};
pub use compiler::compile;
pub use evaluator::EvaluatedPrompt;
pub use events::{EngineEvent, EventSink, NullSink, SharedEventSink};
pub use generator::GeneratedPrompt;
pub use scorer::score;
pub use session::{GenerationOutcome, GenerationSession};

use std::sync::Arc;
use tracing::debug;

use crate::ai::credentials::Credentials;
use crate::ai::provider::{Completion, CompletionRequest, SharedCompletionService};
use crate::model::{ModelConfig, UsageRecord};
use crate::types::Result;

/// Default number of variant rewrites in flight at once
pub const DEFAULT_VARIANT_CONCURRENCY: usize = 3;

pub struct PromptEngine {
    service: SharedCompletionService,
    events: SharedEventSink,
    system_model: ModelConfig,
    styles: Vec<VariantStyle>,
    variant_concurrency: usize,
}

impl std::fmt::Debug for PromptEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptEngine")
            .field("system_model", &self.system_model)
            .field("styles", &self.styles.len())
            .field("variant_concurrency", &self.variant_concurrency)
            .finish()
    }
}

impl PromptEngine {
    pub fn new(service: SharedCompletionService) -> Self {
        Self {
            service,
            events: Arc::new(NullSink),
            system_model: ModelConfig::system(),
            styles: VariantStyle::defaults(),
            variant_concurrency: DEFAULT_VARIANT_CONCURRENCY,
        }
    }

    pub fn with_events(mut self, events: SharedEventSink) -> Self {
        self.events = events;
        self
    }

    /// Replace the APE style list
    pub fn with_styles(mut self, styles: Vec<VariantStyle>) -> Self {
        self.styles = styles;
        self
    }

    /// Variant rewrites in flight at once; 1 runs them one by one
    pub fn with_variant_concurrency(mut self, concurrency: usize) -> Self {
        self.variant_concurrency = concurrency.max(1);
        self
    }

    pub fn system_model(&self) -> &ModelConfig {
        &self.system_model
    }

    pub fn styles(&self) -> &[VariantStyle] {
        &self.styles
    }

    /// One completion call; usage is left to the caller
    async fn complete(
        &self,
        request: CompletionRequest,
        credentials: &Credentials,
    ) -> Result<Completion> {
        debug!(
            "Completion request: provider={}, model={}",
            request.provider, request.model
        );
        self.service.complete(&request, credentials).await
    }

    fn emit(&self, event: EngineEvent) {
        self.events.emit(event);
    }

    fn record_usage(&self, usage: UsageRecord) {
        self.emit(EngineEvent::Usage(usage));
    }
}
