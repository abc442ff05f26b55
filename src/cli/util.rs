//! CLI Common Utilities
//!
//! Shared initialization and context management for CLI commands.

use std::path::Path;
use std::sync::Arc;

use crate::ai::credentials::{CredentialSource, Credentials};
use crate::ai::provider::HttpCompletionService;
use crate::catalog::Catalog;
use crate::config::{Config, ConfigLoader};
use crate::engine::{GenerationSession, PromptEngine};
use crate::storage::{Database, Recorder, SharedDatabase};
use crate::types::Result;

/// Command execution context
///
/// Configuration, catalog and credentials resolved once per invocation.
pub struct CommandContext {
    pub config: Config,
    pub catalog: Catalog,
    pub credentials: Credentials,
}

impl CommandContext {
    /// Load the layered configuration, or only `config_path` when given
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        let catalog = Catalog::load_or_builtin(config.catalog.path.as_deref())?;
        let credentials = CredentialSource::from_config(&config.credentials).resolve();

        Ok(Self {
            config,
            catalog,
            credentials,
        })
    }

    pub fn open_database(&self) -> Result<SharedDatabase> {
        Ok(Arc::new(Database::open(&self.config.storage.database)?))
    }

    /// Engine wired to the HTTP providers and, when storage is enabled,
    /// to a background recorder. Must be called inside a tokio runtime.
    pub fn engine(&self) -> Result<EngineHandle> {
        let service = Arc::new(HttpCompletionService::new(&self.config.llm)?);
        let mut engine = PromptEngine::new(service)
            .with_variant_concurrency(self.config.llm.variant_concurrency);

        let recorder = if self.config.storage.enabled {
            let (recorder, _task) = Recorder::spawn(self.open_database()?);
            engine = engine.with_events(Arc::new(recorder.clone()));
            Some(recorder)
        } else {
            None
        };

        Ok(EngineHandle {
            engine: Arc::new(engine),
            recorder,
        })
    }
}

/// Engine plus the recorder feeding its events to storage
pub struct EngineHandle {
    pub engine: Arc<PromptEngine>,
    recorder: Option<Recorder>,
}

impl EngineHandle {
    pub fn session(&self) -> GenerationSession {
        GenerationSession::new(Arc::clone(&self.engine))
    }

    /// Wait for pending history and usage writes
    pub async fn finish(&self) {
        if let Some(recorder) = &self.recorder {
            recorder.flush().await;
        }
    }
}
