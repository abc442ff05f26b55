//! promptcopilot - Prompt Assembly and Evaluation Engine
//!
//! Builds prompts for LLM providers from a catalog of use cases,
//! techniques, length modes and output formats, grades them and refines
//! them with AI assistance.
//!
//! ## Core Features
//!
//! - **Compiler**: deterministic template substitution over a fixed token set
//! - **Heuristic Scorer**: clarity, specificity and structure grading
//! - **AI Generator**: meta-prompt drafting with a compiler fallback
//! - **APE**: scored stylistic rewrites, one per variant style
//! - **Chains**: sequential steps piping `{{STEP_<n>_OUTPUT}}` forward
//!
//! ## Quick Start
//!
//! ```ignore
//! use promptcopilot::{Catalog, CredentialSource, HttpCompletionService, PromptConfig, PromptEngine};
//!
//! let catalog = Catalog::builtin()?;
//! let mut config = PromptConfig::new(&catalog)?;
//! config.select_technique(&catalog, "cot", true)?;
//! config.context = "Explain how tides work".to_string();
//!
//! let service = HttpCompletionService::new(&Default::default())?;
//! let engine = PromptEngine::new(Arc::new(service));
//! let credentials = CredentialSource::Environment.resolve();
//! let generated = engine.generate(&config, &credentials).await?;
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: template catalog and placeholder vocabulary
//! - [`model`]: configuration, score and record types
//! - [`engine`]: compiler, scorer, generator, APE, chains, sessions
//! - [`ai`]: provider clients, credentials, response parsing
//! - [`storage`]: SQLite prompt history and usage log
//! - [`config`]: layered configuration

pub mod ai;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod engine;
pub mod model;
pub mod storage;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};
pub use types::error::{ErrorCategory, PromptError, Result, ResultExt};

pub use catalog::Catalog;
pub use model::{
    ApeVariant, ChainStep, Example, ModelConfig, PromptConfig, PromptRecord, PromptScore,
    UsageRecord,
};

// =============================================================================
// Engine Re-exports
// =============================================================================

pub use engine::{
    EngineEvent, EventSink, GenerationSession, PromptEngine, compile, score,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    CompletionService, CredentialSource, Credentials, HttpCompletionService, ProviderKind,
};

// =============================================================================
// Storage Re-exports
// =============================================================================

pub use storage::{Database, HistoryStore, Recorder, SharedDatabase, UsageStore};
