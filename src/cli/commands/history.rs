//! History Command
//!
//! Browse and manage saved prompts.

use console::style;

use crate::cli::CommandContext;
use crate::cli::ui::Output;
use crate::model::RecordKind;
use crate::storage::HistoryStore;
use crate::types::{PromptError, Result};

pub fn list(ctx: &CommandContext, kind: Option<RecordKind>, limit: usize, json: bool) -> Result<()> {
    let db = ctx.open_database()?;
    let records = HistoryStore::new(&db).list(kind, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        Output::new().info("No saved prompts yet");
        return Ok(());
    }

    for record in records {
        println!(
            "{}  {:<8} {}",
            style(&record.id).dim(),
            record.kind.as_str(),
            record.name
        );
    }
    Ok(())
}

pub fn show(ctx: &CommandContext, id: &str, json: bool) -> Result<()> {
    let db = ctx.open_database()?;
    let record = HistoryStore::new(&db)
        .get(id)?
        .ok_or_else(|| PromptError::not_found("prompt", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let out = Output::new();
    out.header(&record.name);
    out.field("id", &record.id);
    out.field("kind", record.kind.as_str());
    out.field("use case", &record.config.use_case.name);
    out.field("technique", &record.config.technique.name);
    out.field(
        "model",
        format!(
            "{} / {}",
            record.config.model_config.provider, record.config.model_config.model
        ),
    );
    out.field("created", record.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if !record.chain_steps.is_empty() {
        let names: Vec<_> = record.chain_steps.iter().map(|s| s.step_name.as_str()).collect();
        out.field("steps", names.join(" → "));
    }
    out.prompt(&record.final_prompt);
    Ok(())
}

pub fn delete(ctx: &CommandContext, id: &str) -> Result<()> {
    let db = ctx.open_database()?;
    if !HistoryStore::new(&db).delete(id)? {
        return Err(PromptError::not_found("prompt", id));
    }
    Output::new().success(&format!("Deleted {}", id));
    Ok(())
}

pub fn rename(ctx: &CommandContext, id: &str, name: &str) -> Result<()> {
    let db = ctx.open_database()?;
    HistoryStore::new(&db).rename(id, name)?;
    Output::new().success(&format!("Renamed {} to \"{}\"", id, name));
    Ok(())
}
