//! Config Command
//!
//! Usage:
//!   promptcopilot config show [-f json]
//!   promptcopilot config path
//!   promptcopilot config init [-g] [--force]

use crate::cli::CommandContext;
use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the effective configuration. Custom keys are never printed.
pub fn show(ctx: &CommandContext, json: bool) -> Result<()> {
    println!("{}", ConfigLoader::render(&ctx.config, json)?);

    let configured: Vec<_> = ctx
        .credentials
        .configured()
        .iter()
        .map(|p| p.display_name())
        .collect();
    let keys = if configured.is_empty() {
        "none".to_string()
    } else {
        configured.join(", ")
    };
    Output::new().info(&format!("API keys available for: {}", keys));
    Ok(())
}

pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

pub fn init(global: bool, force: bool) -> Result<()> {
    let dir = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(force)?
    };
    Output::new().success(&format!(
        "Initialized configuration in {}",
        dir.display()
    ));
    Ok(())
}
