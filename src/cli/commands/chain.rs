//! Chain Command
//!
//! Execute a workflow file step by step, printing each output as it arrives.

use console::style;
use std::path::Path;
use std::time::Instant;

use crate::cli::CommandContext;
use crate::cli::input::{ChainSpec, load_file};
use crate::cli::ui::Output;
use crate::engine::{ChainObserver, ChainOutcome};
use crate::types::{PromptError, Result};

struct ConsoleObserver {
    total: usize,
    started: Instant,
}

impl ChainObserver for ConsoleObserver {
    fn step_started(&self, step: usize, step_name: &str) {
        eprintln!(
            "{} {}",
            style(format!("[{}/{}]", step, self.total)).dim(),
            style(step_name).bold()
        );
    }

    fn step_completed(&self, step: usize, step_name: &str, output: &str) {
        println!();
        println!("{}", style(format!("── Step {}: {} ──", step, step_name)).cyan());
        println!("{}", output);
        eprintln!(
            "{} step {} done after {:.1}s",
            style("✓").green(),
            step,
            self.started.elapsed().as_secs_f32()
        );
    }
}

pub async fn run(ctx: &CommandContext, chain_path: &Path) -> Result<()> {
    let chain: ChainSpec = load_file(chain_path)?;
    let steps = chain.resolve(&ctx.catalog, &ctx.config.defaults)?;
    let observer = ConsoleObserver {
        total: steps.len(),
        started: Instant::now(),
    };

    let handle = ctx.engine()?;
    let result = handle
        .engine
        .execute_chain_with(&steps, &ctx.credentials, &observer)
        .await;
    handle.finish().await;

    match ChainOutcome::from_result(result)? {
        ChainOutcome::Completed(outputs) => {
            Output::new().success(&format!("Workflow finished: {} steps", outputs.len()));
            Ok(())
        }
        ChainOutcome::FailedAtStep {
            step,
            step_name,
            completed,
            error,
        } => Err(PromptError::ChainAborted {
            step,
            step_name,
            completed,
            source: error,
        }),
    }
}
