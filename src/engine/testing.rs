//! In-process doubles for engine tests

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{EngineEvent, EventSink};
use crate::ai::credentials::Credentials;
use crate::ai::provider::{
    Completion, CompletionRequest, CompletionService, ProviderKind, ResponseMetadata,
    ResponseTiming, TokenUsage,
};
use crate::catalog::Catalog;
use crate::model::{PromptConfig, PromptRecord, UsageRecord};
use crate::types::{ErrorCategory, LlmError, PromptError, Result};

type Handler = Box<dyn Fn(&CompletionRequest) -> Result<String> + Send + Sync>;

/// Completion service answering from a closure and recording every request
pub(crate) struct ScriptedService {
    handler: Handler,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedService {
    pub fn new(
        handler: impl Fn(&CompletionRequest) -> Result<String> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        let message = message.to_string();
        Self::new(move |req| Err(upstream_error(&message, req.provider)))
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Text of the single user message of every request, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|r| r.messages[0].content.clone())
            .collect()
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    async fn complete(
        &self,
        request: &CompletionRequest,
        credentials: &Credentials,
    ) -> Result<Completion> {
        credentials.require(request.provider, "scripted call")?;
        self.calls.lock().unwrap().push(request.clone());
        let text = (self.handler)(request)?;
        Ok(Completion {
            text,
            usage: TokenUsage::new(10, 5),
            timing: ResponseTiming { total_ms: 1 },
            metadata: ResponseMetadata {
                provider: request.provider,
                model: request.model.clone(),
                raw_usage: None,
            },
        })
    }
}

pub(crate) fn upstream_error(message: &str, provider: ProviderKind) -> PromptError {
    PromptError::Llm(LlmError::with_provider(
        ErrorCategory::Unavailable,
        message,
        provider,
    ))
}

/// Sink keeping every event it receives
#[derive(Default)]
pub(crate) struct CollectingSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn usage(&self) -> Vec<UsageRecord> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                EngineEvent::Usage(u) => Some(u.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn prompts(&self) -> Vec<PromptRecord> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                EngineEvent::PromptGenerated(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub(crate) fn groq_credentials() -> Credentials {
    Credentials::new().with_key(ProviderKind::Groq, "gsk-test")
}

pub(crate) fn default_config() -> PromptConfig {
    PromptConfig::new(&Catalog::builtin().unwrap()).unwrap()
}
