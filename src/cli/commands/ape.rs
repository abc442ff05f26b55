//! APE Command
//!
//! Generate one AI rewrite per variant style and show them scored.

use std::path::Path;

use crate::cli::CommandContext;
use crate::cli::input::{PromptSpec, load_file};
use crate::cli::ui::Output;
use crate::model::rank_variants;
use crate::types::Result;

pub async fn run(ctx: &CommandContext, spec_path: &Path, ranked: bool, json: bool) -> Result<()> {
    let spec: PromptSpec = load_file(spec_path)?;
    let config = spec.resolve(&ctx.catalog, &ctx.config.defaults)?;

    let handle = ctx.engine()?;
    let result = handle.session().ape(&config, &ctx.credentials).await;
    handle.finish().await;
    let variants = result?;

    let ordered: Vec<_> = if ranked {
        rank_variants(&variants)
    } else {
        variants.iter().collect()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&ordered)?);
        return Ok(());
    }

    let out = Output::new();
    for (rank, variant) in ordered.iter().enumerate() {
        out.variant(rank + 1, variant);
    }
    let failed = variants.iter().filter(|v| v.is_fallback()).count();
    if failed > 0 {
        out.warning(&format!("{} of {} variants fell back to the base prompt", failed, variants.len()));
    }
    Ok(())
}
