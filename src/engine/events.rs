//! Engine notifications
//!
//! The engine reports usage and generated prompts through an [`EventSink`]
//! and never waits on it. Persisting, logging or dropping events is the
//! sink's business.

use std::sync::Arc;

use crate::model::{PromptRecord, UsageRecord};

#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// One completion call, or a generator fallback
    Usage(UsageRecord),
    /// A prompt worth keeping in history
    PromptGenerated(PromptRecord),
}

/// Fire-and-forget receiver of engine events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub type SharedEventSink = Arc<dyn EventSink>;

/// Sink that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: EngineEvent) {}
}
