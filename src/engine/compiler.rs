//! Prompt Compiler
//!
//! Deterministic template substitution: the four selected catalog fragments
//! are joined and each recognized placeholder is replaced in a fixed order.
//!
//! 1. `[[EXAMPLES]]` (first occurrence)
//! 2. `[[SCHEMA]]` (first occurrence)
//! 3. `[[CONTEXT]]`, `[[PERSONA]]`, `[[ROLE]]`, `[[CONSTRAINTS]]`, `[[GOAL]]`
//!    (every occurrence, in that order)
//!
//! Passes run one after another over the whole text, so a field value that
//! itself contains a later token is substituted by that later pass.
//! Replacement text is inserted literally. Unrecognized `[[...]]` sequences
//! are left alone.

use crate::catalog::Placeholder;
use crate::constants::compiler::{
    DEFAULT_CONSTRAINTS, DEFAULT_CONTEXT, DEFAULT_GOAL, DEFAULT_PERSONA, FRAGMENT_SEPARATOR,
    JSON_FORMAT_ID,
};
use crate::model::{Example, PromptConfig};

/// Assemble the final prompt text for `config`
pub fn compile(config: &PromptConfig) -> String {
    let mut prompt = [
        config.use_case.template.as_str(),
        config.technique.template.as_str(),
        config.length_mode.modifier.as_str(),
        config.output_format.template.as_str(),
    ]
    .join(FRAGMENT_SEPARATOR);

    let examples = if config.technique.supports_examples && !config.examples.is_empty() {
        render_examples(&config.examples)
    } else {
        String::new()
    };
    prompt = prompt.replacen(Placeholder::Examples.token(), &examples, 1);
    prompt = prompt.replacen(Placeholder::Schema.token(), resolve_schema(config), 1);

    let persona = or_default(&config.persona, DEFAULT_PERSONA);
    let passes = [
        (Placeholder::Context, or_default(&config.context, DEFAULT_CONTEXT)),
        (Placeholder::Persona, persona),
        (Placeholder::Role, persona),
        (Placeholder::Constraints, or_default(&config.constraints, DEFAULT_CONSTRAINTS)),
        (Placeholder::Goal, or_default(&config.goal, DEFAULT_GOAL)),
    ];
    for (placeholder, value) in passes {
        prompt = prompt.replace(placeholder.token(), value);
    }

    prompt.trim().to_string()
}

/// `Example <n>:` blocks, numbered from 1 and separated by blank lines
pub(crate) fn render_examples(examples: &[Example]) -> String {
    examples
        .iter()
        .enumerate()
        .map(|(i, ex)| format!("Example {}:\nInput: {}\nOutput: {}", i + 1, ex.input, ex.output))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// User schema for JSON output or schema-aware techniques, else the
/// format's example schema
fn resolve_schema(config: &PromptConfig) -> &str {
    let user_schema = config.schema.as_deref().filter(|s| !s.is_empty());

    match user_schema {
        Some(schema) if config.output_format.id == JSON_FORMAT_ID => schema,
        Some(schema) if config.technique.supports_schema => schema,
        _ => config.output_format.example_schema.as_deref().unwrap_or(""),
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() { default } else { value }
}
