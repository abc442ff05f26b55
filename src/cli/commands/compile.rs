//! Compile Command
//!
//! Print the deterministic template compilation of a spec file.

use std::path::Path;

use crate::cli::CommandContext;
use crate::cli::input::{PromptSpec, load_file};
use crate::engine::compile;
use crate::types::Result;

pub fn run(ctx: &CommandContext, spec_path: &Path) -> Result<()> {
    let spec: PromptSpec = load_file(spec_path)?;
    let config = spec.resolve(&ctx.catalog, &ctx.config.defaults)?;
    println!("{}", compile(&config));
    Ok(())
}
