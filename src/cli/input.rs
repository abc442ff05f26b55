//! Prompt and chain definition files
//!
//! A spec file names catalog entries by id and fills in the free-text
//! fields. TOML, YAML and JSON are accepted, chosen by file extension.
//!
//! ```toml
//! use_case = "code_generation"
//! technique = "few_shot"
//! output_format = "json"
//! schema_preset = "classification"
//! context = "Classify support tickets by urgency"
//!
//! [[examples]]
//! input = "Server is down"
//! output = "urgent"
//!
//! [model]
//! provider = "openai"
//! model = "gpt-4o-mini"
//! ```

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::ai::provider::ProviderKind;
use crate::catalog::Catalog;
use crate::model::{ChainStep, ModelConfig, PromptConfig};
use crate::types::{PromptError, Result};

/// One prompt definition
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PromptSpec {
    pub use_case: Option<String>,
    pub technique: Option<String>,
    pub length_mode: Option<String>,
    pub output_format: Option<String>,
    /// Adopt the technique's and length mode's recommended parameters
    pub apply_recommended: bool,
    pub context: String,
    pub constraints: String,
    pub persona: String,
    pub goal: String,
    pub examples: Vec<ExampleSpec>,
    pub schema: Option<String>,
    /// Preset id of the selected output format; ignored when `schema` is set
    pub schema_preset: Option<String>,
    pub model: ModelOverrides,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExampleSpec {
    pub input: String,
    pub output: String,
}

/// Fields replacing the configured default model
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelOverrides {
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub max_tokens: Option<u32>,
}

impl ModelOverrides {
    fn apply(&self, model: &mut ModelConfig) {
        if let Some(provider) = self.provider {
            model.provider = provider;
        }
        if let Some(name) = &self.model {
            model.model = name.clone();
        }
        if let Some(temperature) = self.temperature {
            model.temperature = temperature;
        }
        if let Some(top_p) = self.top_p {
            model.top_p = top_p;
        }
        if let Some(top_k) = self.top_k {
            model.top_k = top_k;
        }
        if let Some(max_tokens) = self.max_tokens {
            model.max_tokens = max_tokens;
        }
    }
}

impl PromptSpec {
    /// Build a validated config. Unset selections keep the catalog defaults;
    /// explicit model fields win over recommended parameters.
    pub fn resolve(&self, catalog: &Catalog, defaults: &ModelConfig) -> Result<PromptConfig> {
        let mut config = PromptConfig::new(catalog)?;
        config.model_config = defaults.clone();

        if let Some(id) = &self.use_case {
            config.select_use_case(catalog, id)?;
        }
        if let Some(id) = &self.technique {
            config.select_technique(catalog, id, self.apply_recommended)?;
        }
        if let Some(id) = &self.length_mode {
            config.select_length_mode(catalog, id, self.apply_recommended)?;
        }
        if let Some(id) = &self.output_format {
            config.select_output_format(catalog, id)?;
        }
        self.model.apply(&mut config.model_config);

        config.context = self.context.clone();
        config.constraints = self.constraints.clone();
        config.persona = self.persona.clone();
        config.goal = self.goal.clone();

        match (&self.schema, &self.schema_preset) {
            (Some(schema), _) => config.schema = Some(schema.clone()),
            (None, Some(preset)) => config.apply_schema_preset(preset)?,
            (None, None) => {}
        }

        for example in &self.examples {
            config.add_example(example.input.as_str(), example.output.as_str())?;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Workflow definition: steps run in file order
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainSpec {
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepSpec {
    pub name: String,
    #[serde(flatten)]
    pub prompt: PromptSpec,
}

impl ChainSpec {
    pub fn resolve(&self, catalog: &Catalog, defaults: &ModelConfig) -> Result<Vec<ChainStep>> {
        self.steps
            .iter()
            .map(|step| {
                let config = step.prompt.resolve(catalog, defaults).map_err(|e| {
                    PromptError::Config(format!("Step '{}': {}", step.name, e))
                })?;
                Ok(ChainStep::new(step.name.as_str(), config))
            })
            .collect()
    }
}

/// Read a TOML, YAML or JSON file into `T`
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("toml") => toml::from_str(&content)
            .map_err(|e| PromptError::Config(format!("{}: {}", path.display(), e))),
        Some("yaml" | "yml") => Ok(serde_yaml::from_str(&content)?),
        Some("json") => Ok(serde_json::from_str(&content)?),
        _ => Err(PromptError::Config(format!(
            "Unsupported file type: {} (expected .toml, .yaml, .yml or .json)",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    #[test]
    fn test_empty_spec_gives_session_defaults() {
        let defaults = ModelConfig::default();
        let config = PromptSpec::default().resolve(&catalog(), &defaults).unwrap();
        assert_eq!(config.use_case.id, "general");
        assert_eq!(config.length_mode.id, "standard");
        assert_eq!(config.model_config, defaults);
    }

    #[test]
    fn test_explicit_model_fields_beat_recommendations() {
        let spec: PromptSpec = toml::from_str(
            r#"
            technique = "cot"
            apply_recommended = true

            [model]
            temperature = 1.2
            "#,
        )
        .unwrap();
        let config = spec.resolve(&catalog(), &ModelConfig::default()).unwrap();
        assert_eq!(config.model_config.temperature, 1.2);
        // From the technique's recommendation
        assert_eq!(config.model_config.top_p, 0.9);
    }

    #[test]
    fn test_schema_preset_and_examples() {
        let spec: PromptSpec = serde_yaml::from_str(
            r#"
output_format: json
schema_preset: summary
examples:
  - input: a
    output: b
"#,
        )
        .unwrap();
        let config = spec.resolve(&catalog(), &ModelConfig::default()).unwrap();
        assert!(config.schema.unwrap().contains("key_points"));
        assert_eq!(config.examples.len(), 1);
    }

    #[test]
    fn test_unknown_catalog_id_is_not_found() {
        let spec = PromptSpec {
            technique: Some("telepathy".to_string()),
            ..Default::default()
        };
        let err = spec.resolve(&catalog(), &ModelConfig::default()).unwrap_err();
        assert!(matches!(err, PromptError::NotFound { .. }));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: std::result::Result<PromptSpec, _> = toml::from_str("contxt = \"typo\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_chain_file_by_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("chain.json");
        std::fs::write(
            &path,
            r#"{"steps": [
                {"name": "Research", "context": "Topic: tides"},
                {"name": "Summarize", "context": "{{STEP_1_OUTPUT}}", "length_mode": "concise"}
            ]}"#,
        )
        .unwrap();

        let chain: ChainSpec = load_file(&path).unwrap();
        let steps = chain.resolve(&catalog(), &ModelConfig::default()).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].step_name, "Summarize");
        assert_eq!(steps[1].config.length_mode.id, "concise");

        let bad = temp.path().join("chain.txt");
        std::fs::write(&bad, "").unwrap();
        assert!(load_file::<ChainSpec>(&bad).is_err());
    }
}
