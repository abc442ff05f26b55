//! Template Catalog
//!
//! Static registry of the four selection dimensions a prompt is built from:
//! use cases, techniques, length modes and output formats. The catalog is
//! loaded once (the embedded document, or a user-supplied JSON file) and is
//! read-only afterwards; prompt configurations hold owned snapshots of the
//! records they select.

mod placeholder;

pub use placeholder::{Placeholder, unknown_tokens};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

use crate::types::{PromptError, Result, ValidationError, ValidationErrorKind};

const BUILTIN_CATALOG: &str = include_str!("builtin.json");

// =============================================================================
// Catalog Records
// =============================================================================

/// Partial model parameters a technique or length mode recommends
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendedConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCase {
    pub id: String,
    pub name: String,
    pub description: String,
    pub template: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technique {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub template: String,
    #[serde(default)]
    pub supports_examples: bool,
    #[serde(default)]
    pub supports_schema: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_config: Option<RecommendedConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthMode {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Template fragment; named `modifier` in catalog documents
    pub modifier: String,
    pub recommended_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_config: Option<RecommendedConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaPreset {
    pub id: String,
    pub name: String,
    pub schema: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFormat {
    pub id: String,
    pub name: String,
    pub description: String,
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<SchemaPreset>,
}

impl OutputFormat {
    pub fn preset(&self, id: &str) -> Result<&SchemaPreset> {
        self.presets
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| PromptError::not_found("schema preset", id))
    }
}

// =============================================================================
// Catalog Kind
// =============================================================================

/// One of the four catalog dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    UseCase,
    Technique,
    LengthMode,
    OutputFormat,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 4] = [
        CatalogKind::UseCase,
        CatalogKind::Technique,
        CatalogKind::LengthMode,
        CatalogKind::OutputFormat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UseCase => "use case",
            Self::Technique => "technique",
            Self::LengthMode => "length mode",
            Self::OutputFormat => "output format",
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CatalogKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "use_case" | "use_cases" => Ok(Self::UseCase),
            "technique" | "techniques" => Ok(Self::Technique),
            "length_mode" | "length_modes" | "length" => Ok(Self::LengthMode),
            "output_format" | "output_formats" | "format" => Ok(Self::OutputFormat),
            _ => Err(format!(
                "Unknown catalog kind: {}. Supported: use-case, technique, length-mode, output-format",
                s
            )),
        }
    }
}

/// Summary row used for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub description: String,
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    use_cases: Vec<UseCase>,
    techniques: Vec<Technique>,
    length_modes: Vec<LengthMode>,
    output_formats: Vec<OutputFormat>,
}

impl Catalog {
    /// The catalog shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse and validate a catalog document
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        debug!(
            "Loaded catalog: {} use cases, {} techniques, {} length modes, {} output formats",
            catalog.use_cases.len(),
            catalog.techniques.len(),
            catalog.length_modes.len(),
            catalog.output_formats.len()
        );
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| {
            PromptError::Config(format!("Invalid catalog {}: {}", path.display(), e))
        })
    }

    /// Load from `path` when given, the embedded catalog otherwise
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    /// Every dimension non-empty, ids unique per dimension
    ///
    /// Unknown placeholder tokens are logged, not rejected: the compiler
    /// passes them through verbatim.
    pub fn validate(&self) -> Result<()> {
        check_dimension(CatalogKind::UseCase, self.use_cases.iter().map(|u| u.id.as_str()))?;
        check_dimension(CatalogKind::Technique, self.techniques.iter().map(|t| t.id.as_str()))?;
        check_dimension(CatalogKind::LengthMode, self.length_modes.iter().map(|l| l.id.as_str()))?;
        check_dimension(
            CatalogKind::OutputFormat,
            self.output_formats.iter().map(|o| o.id.as_str()),
        )?;

        let templates = self
            .use_cases
            .iter()
            .map(|u| (&u.id, &u.template))
            .chain(self.techniques.iter().map(|t| (&t.id, &t.template)))
            .chain(self.length_modes.iter().map(|l| (&l.id, &l.modifier)))
            .chain(self.output_formats.iter().map(|o| (&o.id, &o.template)));
        for (id, template) in templates {
            for token in unknown_tokens(template) {
                warn!("Catalog entry '{}' uses unrecognized token {}", id, token);
            }
        }

        Ok(())
    }

    pub fn use_cases(&self) -> &[UseCase] {
        &self.use_cases
    }

    pub fn techniques(&self) -> &[Technique] {
        &self.techniques
    }

    pub fn length_modes(&self) -> &[LengthMode] {
        &self.length_modes
    }

    pub fn output_formats(&self) -> &[OutputFormat] {
        &self.output_formats
    }

    pub fn use_case(&self, id: &str) -> Result<&UseCase> {
        find(&self.use_cases, CatalogKind::UseCase, id, |u| &u.id)
    }

    pub fn technique(&self, id: &str) -> Result<&Technique> {
        find(&self.techniques, CatalogKind::Technique, id, |t| &t.id)
    }

    pub fn length_mode(&self, id: &str) -> Result<&LengthMode> {
        find(&self.length_modes, CatalogKind::LengthMode, id, |l| &l.id)
    }

    pub fn output_format(&self, id: &str) -> Result<&OutputFormat> {
        find(&self.output_formats, CatalogKind::OutputFormat, id, |o| &o.id)
    }

    // Session defaults: first use case, first technique, second length mode,
    // first output format.

    pub(crate) fn default_use_case(&self) -> Result<&UseCase> {
        first(&self.use_cases, CatalogKind::UseCase)
    }

    pub(crate) fn default_technique(&self) -> Result<&Technique> {
        first(&self.techniques, CatalogKind::Technique)
    }

    /// Second entry ("standard" in the shipped catalog), or the only one
    pub(crate) fn default_length_mode(&self) -> Result<&LengthMode> {
        match self.length_modes.get(1) {
            Some(mode) => Ok(mode),
            None => first(&self.length_modes, CatalogKind::LengthMode),
        }
    }

    pub(crate) fn default_output_format(&self) -> Result<&OutputFormat> {
        first(&self.output_formats, CatalogKind::OutputFormat)
    }

    /// Listing rows for one dimension, in catalog order
    pub fn entries(&self, kind: CatalogKind) -> Vec<CatalogEntry> {
        fn row(id: &str, name: &str, description: &str) -> CatalogEntry {
            CatalogEntry {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
            }
        }

        match kind {
            CatalogKind::UseCase => self
                .use_cases
                .iter()
                .map(|u| row(&u.id, &u.name, &u.description))
                .collect(),
            CatalogKind::Technique => self
                .techniques
                .iter()
                .map(|t| row(&t.id, &t.name, &t.description))
                .collect(),
            CatalogKind::LengthMode => self
                .length_modes
                .iter()
                .map(|l| row(&l.id, &l.name, &l.description))
                .collect(),
            CatalogKind::OutputFormat => self
                .output_formats
                .iter()
                .map(|o| row(&o.id, &o.name, &o.description))
                .collect(),
        }
    }
}

fn check_dimension<'a>(kind: CatalogKind, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(ValidationError::new(
                ValidationErrorKind::MissingField,
                format!("{} with empty id", kind),
            )
            .with_field("id")
            .into());
        }
        if !seen.insert(id) {
            return Err(ValidationError::new(
                ValidationErrorKind::Consistency,
                format!("duplicate {} id '{}'", kind, id),
            )
            .with_field("id")
            .into());
        }
    }

    if seen.is_empty() {
        return Err(ValidationError::new(
            ValidationErrorKind::MissingField,
            format!("catalog has no {} entries", kind),
        )
        .into());
    }
    Ok(())
}

fn first<T>(items: &[T], kind: CatalogKind) -> Result<&T> {
    items.first().ok_or_else(|| {
        ValidationError::new(
            ValidationErrorKind::MissingField,
            format!("catalog has no {} entries", kind),
        )
        .into()
    })
}

fn find<'a, T>(
    items: &'a [T],
    kind: CatalogKind,
    id: &str,
    key: impl Fn(&T) -> &String,
) -> Result<&'a T> {
    items
        .iter()
        .find(|item| key(item) == id)
        .ok_or_else(|| PromptError::not_found(kind.as_str(), id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(use_cases: &str) -> String {
        format!(
            r#"{{
                "use_cases": {use_cases},
                "techniques": [{{"id": "t", "name": "T", "category": "c", "description": "", "template": ""}}],
                "length_modes": [{{"id": "l", "name": "L", "description": "", "modifier": "", "recommended_tokens": 10}}],
                "output_formats": [{{"id": "o", "name": "O", "description": "", "template": ""}}]
            }}"#
        )
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert!(!catalog.use_cases().is_empty());
        assert!(catalog.technique("cot").is_ok());
        assert!(catalog.technique("mega_prompt").is_ok());
        assert!(catalog.technique("few_shot").unwrap().supports_examples);

        let json = catalog.output_format("json").unwrap();
        assert!(json.example_schema.is_some());
        assert!(json.preset("classification").is_ok());
    }

    #[test]
    fn test_builtin_templates_use_known_tokens_only() {
        let catalog = Catalog::builtin().unwrap();
        for technique in catalog.techniques() {
            assert!(unknown_tokens(&technique.template).is_empty(), "{}", technique.id);
        }
        for use_case in catalog.use_cases() {
            assert!(unknown_tokens(&use_case.template).is_empty(), "{}", use_case.id);
        }
    }

    #[test]
    fn test_defaults_follow_catalog_order() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.default_use_case().unwrap().id, catalog.use_cases()[0].id);
        assert_eq!(
            catalog.default_length_mode().unwrap().id,
            catalog.length_modes()[1].id
        );
    }

    #[test]
    fn test_single_length_mode_is_default() {
        let catalog = Catalog::from_json(&minimal(
            r#"[{"id": "u", "name": "U", "description": "", "template": ""}]"#,
        ))
        .unwrap();
        assert_eq!(catalog.default_length_mode().unwrap().id, "l");
    }

    #[test]
    fn test_empty_dimension_rejected() {
        let err = Catalog::from_json(&minimal("[]")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = Catalog::from_json(&minimal(
            r#"[{"id": "u", "name": "A", "description": "", "template": ""},
                {"id": "u", "name": "B", "description": "", "template": ""}]"#,
        ))
        .unwrap_err();
        assert!(err.to_string().contains("duplicate use case id 'u'"));
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let catalog = Catalog::builtin().unwrap();
        let err = catalog.technique("telepathy").unwrap_err();
        assert!(matches!(err, PromptError::NotFound { .. }));
        assert_eq!(err.to_string(), "Unknown technique 'telepathy'");
    }

    #[test]
    fn test_entries_and_kind_parsing() {
        let catalog = Catalog::builtin().unwrap();
        let kind: CatalogKind = "output-format".parse().unwrap();
        let rows = catalog.entries(kind);
        assert_eq!(rows.len(), catalog.output_formats().len());
        assert!("colors".parse::<CatalogKind>().is_err());
    }
}
