//! Generate Command
//!
//! AI-drafted prompt for a spec file, saved to history and scored.

use std::path::Path;

use crate::cli::CommandContext;
use crate::cli::input::{PromptSpec, load_file};
use crate::cli::ui::Output;
use crate::types::Result;

pub async fn run(ctx: &CommandContext, spec_path: &Path, json: bool) -> Result<()> {
    let spec: PromptSpec = load_file(spec_path)?;
    let config = spec.resolve(&ctx.catalog, &ctx.config.defaults)?;

    let handle = ctx.engine()?;
    let result = handle.session().generate(&config, &ctx.credentials).await;
    handle.finish().await;
    let outcome = result?;

    if json {
        let value = serde_json::json!({
            "prompt": outcome.prompt,
            "fallback": outcome.usage.is_fallback(),
            "score": outcome.score,
            "score_error": outcome.score_error,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let out = Output::new();
    if outcome.usage.is_fallback() {
        out.warning("AI generation failed; showing the template compilation instead");
    }
    out.prompt(&outcome.prompt);
    match (&outcome.score, &outcome.score_error) {
        (Some(score), _) => out.score(score),
        (None, Some(error)) => out.warning(&format!("Prompt kept, but scoring failed: {}", error)),
        (None, None) => {}
    }
    Ok(())
}
