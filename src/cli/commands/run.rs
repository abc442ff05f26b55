//! Run Command
//!
//! Generate a prompt for a spec file, then execute it with the spec's model.

use std::path::Path;

use crate::cli::CommandContext;
use crate::cli::input::{PromptSpec, load_file};
use crate::cli::ui::Output;
use crate::types::Result;

pub async fn run(ctx: &CommandContext, spec_path: &Path, show_prompt: bool) -> Result<()> {
    let spec: PromptSpec = load_file(spec_path)?;
    let config = spec.resolve(&ctx.catalog, &ctx.config.defaults)?;
    let out = Output::new();

    let handle = ctx.engine()?;
    let result = async {
        let outcome = handle.session().generate(&config, &ctx.credentials).await?;
        if show_prompt {
            out.section("Prompt");
            out.prompt(&outcome.prompt);
        }
        handle
            .engine
            .run_prompt(&outcome.prompt, &config.model_config, &ctx.credentials)
            .await
    }
    .await;
    handle.finish().await;
    let completion = result?;

    if show_prompt {
        out.section("Response");
    }
    println!("{}", completion.text);
    out.info(&format!(
        "{} / {}: {} tokens in {}ms",
        completion.metadata.provider.display_name(),
        completion.metadata.model,
        completion.usage.total(),
        completion.timing.total_ms
    ));
    Ok(())
}
