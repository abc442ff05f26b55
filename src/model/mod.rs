//! Domain Model
//!
//! Value types shared by the engine, storage and CLI:
//!
//! - [`ModelConfig`]: provider, model and sampling parameters
//! - [`PromptConfig`], [`Example`], [`ChainStep`]: what a prompt is built from
//! - [`PromptScore`], [`ApeVariant`]: evaluation results
//! - [`UsageRecord`], [`PromptRecord`]: what gets persisted

mod config;
mod prompt;
mod record;
mod score;

pub use config::ModelConfig;
pub use prompt::{ChainStep, Example, PromptConfig};
pub use record::{PromptRecord, RecordKind, UsageRecord};
pub use score::{ApeVariant, PromptScore, VariantMeta, best_variant, rank_variants};
