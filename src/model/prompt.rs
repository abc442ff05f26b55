//! Prompt configuration: catalog selections plus free-form fields

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ModelConfig;
use crate::catalog::{Catalog, LengthMode, OutputFormat, Technique, UseCase};
use crate::constants::limits::{MAX_CONTEXT_CHARS, MAX_EXAMPLES};
use crate::types::{PromptError, Result, ValidationError, ValidationErrorKind};

/// One few-shot input/output pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub id: String,
    pub input: String,
    pub output: String,
}

impl Example {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Everything needed to compile, draft or score one prompt
///
/// Catalog selections are owned snapshots, so a config stays meaningful
/// after being stored in history even if the catalog later changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptConfig {
    pub use_case: UseCase,
    pub technique: Technique,
    pub length_mode: LengthMode,
    pub output_format: OutputFormat,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub constraints: String,
    #[serde(default)]
    pub persona: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub model_config: ModelConfig,
}

impl PromptConfig {
    /// Session default: first use case, first technique, second length
    /// mode, first output format, default model config
    pub fn new(catalog: &Catalog) -> Result<Self> {
        Ok(Self {
            use_case: catalog.default_use_case()?.clone(),
            technique: catalog.default_technique()?.clone(),
            length_mode: catalog.default_length_mode()?.clone(),
            output_format: catalog.default_output_format()?.clone(),
            context: String::new(),
            constraints: String::new(),
            persona: String::new(),
            goal: String::new(),
            examples: Vec::new(),
            schema: None,
            model_config: ModelConfig::default(),
        })
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    pub fn select_use_case(&mut self, catalog: &Catalog, id: &str) -> Result<()> {
        self.use_case = catalog.use_case(id)?.clone();
        Ok(())
    }

    /// Select a technique, optionally adopting its recommended parameters
    pub fn select_technique(
        &mut self,
        catalog: &Catalog,
        id: &str,
        apply_recommended: bool,
    ) -> Result<()> {
        self.technique = catalog.technique(id)?.clone();
        if apply_recommended && let Some(recommended) = &self.technique.recommended_config {
            self.model_config.apply(recommended);
        }
        Ok(())
    }

    /// Select a length mode, optionally adopting its recommended parameters
    pub fn select_length_mode(
        &mut self,
        catalog: &Catalog,
        id: &str,
        apply_recommended: bool,
    ) -> Result<()> {
        self.length_mode = catalog.length_mode(id)?.clone();
        if apply_recommended && let Some(recommended) = &self.length_mode.recommended_config {
            self.model_config.apply(recommended);
        }
        Ok(())
    }

    pub fn select_output_format(&mut self, catalog: &Catalog, id: &str) -> Result<()> {
        self.output_format = catalog.output_format(id)?.clone();
        Ok(())
    }

    /// Use one of the selected output format's schema presets
    pub fn apply_schema_preset(&mut self, preset_id: &str) -> Result<()> {
        let schema = self.output_format.preset(preset_id)?.schema.clone();
        self.schema = Some(schema);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Examples
    // -------------------------------------------------------------------------

    pub fn add_example(
        &mut self,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Result<&Example> {
        if self.examples.len() >= MAX_EXAMPLES {
            return Err(examples_capacity_error(self.examples.len() + 1));
        }
        self.examples.push(Example::new(input, output));
        Ok(&self.examples[self.examples.len() - 1])
    }

    pub fn remove_example(&mut self, id: &str) -> Result<Example> {
        let index = self.example_index(id)?;
        Ok(self.examples.remove(index))
    }

    pub fn update_example(
        &mut self,
        id: &str,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Result<()> {
        let index = self.example_index(id)?;
        let example = &mut self.examples[index];
        example.input = input.into();
        example.output = output.into();
        Ok(())
    }

    fn example_index(&self, id: &str) -> Result<usize> {
        self.examples
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| PromptError::not_found("example", id))
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Example cap, context length and model parameter bounds
    pub fn validate(&self) -> Result<()> {
        if self.examples.len() > MAX_EXAMPLES {
            return Err(examples_capacity_error(self.examples.len()));
        }

        let context_chars = self.context.chars().count();
        if context_chars > MAX_CONTEXT_CHARS {
            return Err(ValidationError::new(
                ValidationErrorKind::Capacity,
                format!(
                    "Context cannot exceed {} characters (got {})",
                    MAX_CONTEXT_CHARS, context_chars
                ),
            )
            .with_field("context")
            .with_comparison(MAX_CONTEXT_CHARS.to_string(), context_chars.to_string())
            .into());
        }

        self.model_config.validate()
    }

    /// Copy of this config with a different context
    pub(crate) fn with_context(&self, context: String) -> Self {
        Self {
            context,
            ..self.clone()
        }
    }
}

fn examples_capacity_error(count: usize) -> PromptError {
    ValidationError::new(
        ValidationErrorKind::Capacity,
        format!("At most {} examples are allowed", MAX_EXAMPLES),
    )
    .with_field("examples")
    .with_comparison(MAX_EXAMPLES.to_string(), count.to_string())
    .into()
}

/// One step of a prompt chain
///
/// The step's context may reference earlier outputs with
/// `{{STEP_<n>_OUTPUT}}`, numbered from 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainStep {
    pub id: String,
    pub step_name: String,
    #[serde(flatten)]
    pub config: PromptConfig,
}

impl ChainStep {
    pub fn new(step_name: impl Into<String>, config: PromptConfig) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            step_name: step_name.into(),
            config,
        }
    }
}
