//! Catalog Command
//!
//! List use cases, techniques, length modes and output formats.

use console::style;

use crate::catalog::CatalogKind;
use crate::cli::CommandContext;
use crate::cli::ui::Output;
use crate::types::Result;

pub fn run(ctx: &CommandContext, kind: Option<CatalogKind>, json: bool) -> Result<()> {
    let kinds: Vec<CatalogKind> = match kind {
        Some(kind) => vec![kind],
        None => CatalogKind::ALL.to_vec(),
    };

    if json {
        let listing: serde_json::Map<String, serde_json::Value> = kinds
            .iter()
            .map(|kind| {
                Ok((
                    kind.as_str().replace(' ', "_"),
                    serde_json::to_value(ctx.catalog.entries(*kind))?,
                ))
            })
            .collect::<Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    let out = Output::new();
    for kind in kinds {
        out.section(&title(kind.as_str()));
        for entry in ctx.catalog.entries(kind) {
            println!(
                "  {:<16} {}  {}",
                style(&entry.id).cyan(),
                entry.name,
                style(&entry.description).dim()
            );
        }
    }
    Ok(())
}

fn title(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => format!("{}{}s", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}
