//! Meta-prompts sent to the system model

use super::compiler::render_examples;
use crate::model::PromptConfig;

/// Instruction asking the system model to draft a prompt for `config`
pub(crate) fn generation_prompt(config: &PromptConfig) -> String {
    let use_case = &config.use_case;
    let technique = &config.technique;
    let length_mode = &config.length_mode.name;
    let output_format = &config.output_format.name;

    let context = or_text(&config.context, "Not specified");
    let persona = or_text(&config.persona, "Not specified");
    let goal = or_text(&config.goal, "Not specified");
    let constraints = or_text(&config.constraints, "None");

    let examples = if config.examples.is_empty() {
        String::new()
    } else {
        format!("**Examples**:\n{}", render_examples(&config.examples))
    };
    let schema = match config.schema.as_deref() {
        Some(schema) if !schema.is_empty() => format!("**Output Schema**: {}", schema),
        _ => String::new(),
    };
    let persona_clause = if config.persona.is_empty() {
        String::new()
    } else {
        format!(" as \"{}\"", config.persona)
    };

    format!(
        "You are an expert prompt engineer. Create a high-quality, optimized prompt based on the following inputs:

**Use Case**: {} - {}
**Context/Task**: {context}
**Persona/Role**: {persona}
**Goal**: {goal}
**Constraints**: {constraints}
**Technique**: {} - {}
**Length Mode**: {length_mode}
**Output Format**: {output_format}
{examples}
{schema}

Generate a {} prompt that:
1. Incorporates the {} technique
2. Is optimized for {}
3. Clearly defines the role/persona{persona_clause}
4. Specifies the desired output format ({output_format})
5. Is well-structured, clear, and specific

Return ONLY the optimized prompt text, nothing else.",
        use_case.name,
        use_case.description,
        technique.name,
        technique.description,
        length_mode.to_lowercase(),
        technique.name,
        use_case.name,
    )
}

/// Instruction asking the system model to rewrite `base` in one style
pub(crate) fn variant_prompt(instruction: &str, base: &str) -> String {
    format!(
        "You are an expert prompt engineer.

Your task: {instruction}

Original Prompt:
\"\"\"
{base}
\"\"\"

Return ONLY the rewritten prompt text. Do not include any conversational filler."
    )
}

/// Instruction asking the system model to grade `prompt` as JSON
pub(crate) fn evaluation_prompt(prompt: &str) -> String {
    format!(
        "You are a professional prompt engineer. Evaluate the quality of the following prompt.

Evaluate on:
- Clarity (0-30): How clear and understandable is the prompt?
- Specificity (0-30): How specific and detailed are the requirements?
- Structure (0-40): How well-structured and organized is the prompt?

Return ONLY JSON using this exact format:
{{
  \"clarity\": number,
  \"specificity\": number,
  \"structure\": number,
  \"total\": number
}}

Prompt to evaluate:
\"\"\"
{prompt}
\"\"\""
    )
}

fn or_text<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}
