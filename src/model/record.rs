//! Usage and history records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use super::{ChainStep, ModelConfig, PromptConfig};
use crate::ai::provider::{Completion, ProviderKind};

/// Token usage of one completion call, or of a generator fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub provider: ProviderKind,
    pub model: String,
    pub prompt_tokens: u32,
    pub response_tokens: u32,
    pub total_tokens: u32,
    /// Providers do not report cost; recorded as zero
    pub cost: f64,
    #[serde(default)]
    pub metadata: Value,
}

impl UsageRecord {
    pub fn from_completion(completion: &Completion) -> Self {
        let usage = completion.usage;
        let mut metadata = serde_json::Map::new();
        if let Some(raw) = &completion.metadata.raw_usage {
            metadata.insert(completion.metadata.provider.as_str().to_string(), raw.clone());
        }
        metadata.insert("latency_ms".to_string(), json!(completion.timing.total_ms));

        Self {
            provider: completion.metadata.provider,
            model: completion.metadata.model.clone(),
            prompt_tokens: usage.input_tokens,
            response_tokens: usage.output_tokens,
            total_tokens: usage.total(),
            cost: 0.0,
            metadata: Value::Object(metadata),
        }
    }

    /// Zero-token record for a draft that fell back to the compiler
    pub fn fallback(model: &ModelConfig, error: &str) -> Self {
        Self {
            provider: model.provider,
            model: model.model.clone(),
            prompt_tokens: 0,
            response_tokens: 0,
            total_tokens: 0,
            cost: 0.0,
            metadata: json!({ "fallback": true, "error": error }),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.metadata
            .get("fallback")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Single,
    Workflow,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Workflow => "workflow",
        }
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "workflow" => Ok(Self::Workflow),
            _ => Err(format!("Unknown record kind: {}", s)),
        }
    }
}

/// History snapshot of a generated prompt or an executed chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub id: String,
    pub name: String,
    pub kind: RecordKind,
    pub config: PromptConfig,
    pub final_prompt: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain_steps: Vec<ChainStep>,
    pub created_at: DateTime<Utc>,
}

impl PromptRecord {
    pub fn single(config: &PromptConfig, final_prompt: impl Into<String>) -> Self {
        let created_at = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: record_name(&config.use_case.name, created_at),
            kind: RecordKind::Single,
            config: config.clone(),
            final_prompt: final_prompt.into(),
            chain_steps: Vec::new(),
            created_at,
        }
    }

    /// Chain snapshot; the first step's config stands for the whole chain
    /// and `final_output` is the last step's output
    pub fn workflow(steps: &[ChainStep], final_output: impl Into<String>) -> Option<Self> {
        let first = steps.first()?;
        let created_at = Utc::now();
        Some(Self {
            id: Uuid::new_v4().to_string(),
            name: record_name(&first.config.use_case.name, created_at),
            kind: RecordKind::Workflow,
            config: first.config.clone(),
            final_prompt: final_output.into(),
            chain_steps: steps.to_vec(),
            created_at,
        })
    }
}

fn record_name(use_case: &str, at: DateTime<Utc>) -> String {
    format!("{} - {}", use_case, at.format("%Y-%m-%d %H:%M:%S"))
}
