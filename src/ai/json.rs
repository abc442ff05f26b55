//! JSON Extraction from Model Output
//!
//! Models asked for "JSON only" still wrap it in code fences, prefix it with
//! a sentence, or leave a trailing comma. This module recovers the first
//! JSON object from such text.

use serde_json::Value;
use tracing::debug;

use crate::types::{PromptError, Result};

/// Parse the JSON object embedded in a model response
pub fn extract_json_from_response(content: &str) -> Result<Value> {
    let cleaned = strip_code_fences(content.trim().trim_start_matches('\u{feff}'));

    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        return Ok(value);
    }

    debug!("Direct JSON parse failed, scanning for embedded object");

    let candidate = first_object(cleaned).unwrap_or(cleaned);
    for attempt in [candidate.to_string(), drop_trailing_commas(candidate)] {
        if let Ok(value) = serde_json::from_str::<Value>(&attempt) {
            return Ok(value);
        }
    }

    Err(PromptError::LlmApi(format!(
        "Response did not contain valid JSON. Content preview: {}...",
        cleaned.chars().take(200).collect::<String>()
    )))
}

fn strip_code_fences(s: &str) -> &str {
    let mut result = s;
    if result.starts_with("```")
        && let Some(first_newline) = result.find('\n')
    {
        result = &result[first_newline + 1..];
    }
    if let Some(stripped) = result.trim_end().strip_suffix("```") {
        result = stripped;
    }
    result.trim()
}

/// Slice of the first balanced `{...}` outside string literals
fn first_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (i, ch) in s[start..].char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn drop_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escape {
            escape = false;
        } else if ch == '\\' && in_string {
            escape = true;
        } else if ch == '"' {
            in_string = !in_string;
        } else if ch == ',' && !in_string {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        result.push(ch);
    }
    result
}
