//! Model parameters for a completion call

use serde::{Deserialize, Serialize};

use crate::ai::provider::ProviderKind;
use crate::catalog::RecommendedConfig;
use crate::constants::{limits, session_defaults, system_model};
use crate::types::{Result, ValidationError, ValidationErrorKind};

/// Provider, model and sampling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    /// Session default for a new prompt configuration
    fn default() -> Self {
        Self {
            provider: ProviderKind::Groq,
            model: session_defaults::MODEL.to_string(),
            temperature: session_defaults::TEMPERATURE,
            top_p: session_defaults::TOP_P,
            top_k: session_defaults::TOP_K,
            max_tokens: session_defaults::MAX_TOKENS,
        }
    }
}

impl ModelConfig {
    /// The fixed configuration behind drafting, scoring and variant generation
    pub fn system() -> Self {
        Self {
            provider: ProviderKind::Groq,
            model: system_model::MODEL.to_string(),
            temperature: system_model::TEMPERATURE,
            top_p: system_model::TOP_P,
            top_k: system_model::TOP_K,
            max_tokens: system_model::MAX_TOKENS,
        }
    }

    /// Check every bound. Called before any call made with this config.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ValidationError::new(
                ValidationErrorKind::MissingField,
                "Model name is required",
            )
            .with_field("model")
            .into());
        }

        let (t_min, t_max) = limits::TEMPERATURE_RANGE;
        if !(t_min..=t_max).contains(&self.temperature) {
            return Err(ValidationError::range(
                "temperature",
                &format!("between {} and {}", t_min, t_max),
                self.temperature,
            )
            .into());
        }

        let (p_min, p_max) = limits::TOP_P_RANGE;
        if !(p_min..=p_max).contains(&self.top_p) {
            return Err(ValidationError::range(
                "top_p",
                &format!("between {} and {}", p_min, p_max),
                self.top_p,
            )
            .into());
        }

        let (m_min, m_max) = limits::MAX_TOKENS_RANGE;
        if !(m_min..=m_max).contains(&self.max_tokens) {
            return Err(ValidationError::range(
                "max_tokens",
                &format!("between {} and {}", m_min, m_max),
                self.max_tokens,
            )
            .into());
        }

        Ok(())
    }

    /// Overlay the parameters a catalog entry recommends
    pub fn apply(&mut self, recommended: &RecommendedConfig) {
        if let Some(temperature) = recommended.temperature {
            self.temperature = temperature;
        }
        if let Some(top_p) = recommended.top_p {
            self.top_p = top_p;
        }
        if let Some(top_k) = recommended.top_k {
            self.top_k = top_k;
        }
        if let Some(max_tokens) = recommended.max_tokens {
            self.max_tokens = max_tokens;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PromptError;

    fn range_field(err: PromptError) -> Option<String> {
        match err {
            PromptError::Validation(v) if v.kind == ValidationErrorKind::Range => v.field,
            _ => None,
        }
    }

    #[test]
    fn test_system_config() {
        let system = ModelConfig::system();
        assert_eq!(system.provider, ProviderKind::Groq);
        assert_eq!(system.model, "llama-3.3-70b-versatile");
        assert_eq!(system.max_tokens, 8192);
        assert_eq!(system.top_k, 40);
        assert!(system.validate().is_ok());
    }

    #[test]
    fn test_session_default_differs_only_in_max_tokens() {
        let default = ModelConfig::default();
        assert_eq!(default.max_tokens, 8000);
        assert_eq!(
            ModelConfig {
                max_tokens: system_model::MAX_TOKENS,
                ..default
            },
            ModelConfig::system()
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut config = ModelConfig {
            temperature: 2.0,
            top_p: 0.0,
            max_tokens: 128_000,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.temperature = 2.1;
        assert_eq!(range_field(config.validate().unwrap_err()).as_deref(), Some("temperature"));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let config = ModelConfig {
            top_p: 1.5,
            ..Default::default()
        };
        assert_eq!(range_field(config.validate().unwrap_err()).as_deref(), Some("top_p"));

        let config = ModelConfig {
            max_tokens: 0,
            ..Default::default()
        };
        assert_eq!(range_field(config.validate().unwrap_err()).as_deref(), Some("max_tokens"));

        let config = ModelConfig {
            temperature: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_model_name_rejected() {
        let config = ModelConfig {
            model: "  ".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Model name is required"));
    }

    #[test]
    fn test_apply_recommended_overlays_present_fields() {
        let mut config = ModelConfig::default();
        config.apply(&RecommendedConfig {
            temperature: Some(0.3),
            max_tokens: Some(4096),
            ..Default::default()
        });
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.top_p, session_defaults::TOP_P);
    }
}
