//! Score Command
//!
//! Grade a prompt with the local heuristic and, optionally, the AI evaluator.
//! Without `--prompt-file` the compiled spec is graded.

use std::path::Path;

use crate::cli::CommandContext;
use crate::cli::input::{PromptSpec, load_file};
use crate::cli::ui::Output;
use crate::engine::{compile, score};
use crate::types::Result;

pub async fn run(
    ctx: &CommandContext,
    spec_path: &Path,
    prompt_file: Option<&Path>,
    ai: bool,
) -> Result<()> {
    let spec: PromptSpec = load_file(spec_path)?;
    let config = spec.resolve(&ctx.catalog, &ctx.config.defaults)?;
    let prompt = match prompt_file {
        Some(path) => std::fs::read_to_string(path)?,
        None => compile(&config),
    };

    let out = Output::new();
    out.section("Heuristic");
    out.score(&score(&prompt, &config));

    if ai {
        let handle = ctx.engine()?;
        let result = handle.engine.evaluate(&prompt, &ctx.credentials).await;
        handle.finish().await;

        out.section("AI evaluation");
        out.score(&result?.score);
    }
    Ok(())
}
