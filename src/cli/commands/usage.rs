//! Usage Command
//!
//! Token usage recorded for every completion call.

use console::style;

use crate::cli::CommandContext;
use crate::cli::ui::Output;
use crate::storage::UsageStore;
use crate::types::Result;

pub fn list(ctx: &CommandContext, limit: usize, json: bool) -> Result<()> {
    let db = ctx.open_database()?;
    let rows = UsageStore::new(&db).list(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        Output::new().info("No usage recorded yet");
        return Ok(());
    }

    for row in rows {
        let marker = if row.record.is_fallback() {
            style(" fallback").yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "{}  {:<10} {:<28} {:>7} tokens{}",
            style(row.created_at.format("%Y-%m-%d %H:%M:%S")).dim(),
            row.record.provider.as_str(),
            row.record.model,
            row.record.total_tokens,
            marker
        );
    }
    Ok(())
}

pub fn summary(ctx: &CommandContext, json: bool) -> Result<()> {
    let db = ctx.open_database()?;
    let summary = UsageStore::new(&db).summary()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let out = Output::new();
    out.section("Usage by model");
    if summary.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for row in &summary {
        println!(
            "  {:<10} {:<28} {:>5} calls  {:>9} tokens  ({} in / {} out, {} fallbacks)",
            row.provider.as_str(),
            row.model,
            row.calls,
            row.total_tokens,
            row.prompt_tokens,
            row.response_tokens,
            row.fallbacks
        );
    }
    let total: u64 = summary.iter().map(|r| r.total_tokens).sum();
    out.field("total tokens", total);
    Ok(())
}
