use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use promptcopilot::PromptError;
use promptcopilot::catalog::CatalogKind;
use promptcopilot::cli::CommandContext;
use promptcopilot::cli::commands;
use promptcopilot::constants::storage::DEFAULT_LIST_LIMIT;
use promptcopilot::model::RecordKind;

#[derive(Parser)]
#[command(name = "promptcopilot")]
#[command(
    version,
    about = "Assemble, score and refine prompts for LLM providers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use only this config file instead of the global/project layers
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog entries
    Catalog {
        #[arg(long, short, help = "use-case, technique, length-mode or output-format")]
        kind: Option<CatalogKind>,
        #[arg(short = 'f', long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Print the template compilation of a spec file
    Compile {
        #[arg(help = "Prompt spec (.toml, .yaml, .json)")]
        spec: PathBuf,
    },

    /// Score a prompt with the local heuristic
    Score {
        #[arg(help = "Prompt spec (.toml, .yaml, .json)")]
        spec: PathBuf,
        #[arg(long, help = "Score this prompt text instead of the compiled spec")]
        prompt_file: Option<PathBuf>,
        #[arg(long, help = "Also ask the AI evaluator")]
        ai: bool,
    },

    /// Draft a prompt with AI, save it to history and score it
    Generate {
        #[arg(help = "Prompt spec (.toml, .yaml, .json)")]
        spec: PathBuf,
        #[arg(short = 'f', long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Generate AI rewrites of the compiled prompt (APE)
    Ape {
        #[arg(help = "Prompt spec (.toml, .yaml, .json)")]
        spec: PathBuf,
        #[arg(long, help = "Order by score, best first")]
        ranked: bool,
        #[arg(short = 'f', long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Generate a prompt and execute it with the spec's model
    Run {
        #[arg(help = "Prompt spec (.toml, .yaml, .json)")]
        spec: PathBuf,
        #[arg(long, help = "Print the generated prompt before the response")]
        show_prompt: bool,
    },

    /// Execute a multi-step workflow
    Chain {
        #[arg(help = "Chain spec with a `steps` list")]
        file: PathBuf,
    },

    /// Saved prompts
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Recorded token usage
    Usage {
        #[command(subcommand)]
        action: UsageAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved prompts, newest first
    List {
        #[arg(long, help = "single or workflow")]
        kind: Option<RecordKind>,
        #[arg(short = 'n', long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
        #[arg(short = 'f', long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Show one saved prompt
    Show {
        id: String,
        #[arg(short = 'f', long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Delete a saved prompt
    Delete { id: String },
    /// Rename a saved prompt
    Rename { id: String, name: String },
}

#[derive(Subcommand)]
enum UsageAction {
    /// Most recent calls
    List {
        #[arg(short = 'n', long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
        #[arg(short = 'f', long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Totals per provider and model
    Summary {
        #[arg(short = 'f', long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show {
        #[arg(short = 'f', long, default_value = "toml", value_parser = ["toml", "json"])]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Write a default configuration file
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mpromptcopilot encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            if let Some(hint) = e
                .downcast_ref::<PromptError>()
                .and_then(PromptError::category)
                .and_then(|category| category.hint())
            {
                eprintln!("\x1b[90mHint: {}\x1b[0m", hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                let ctx = CommandContext::load(config_path)?;
                commands::config::show(&ctx, format == "json")?;
            }
            ConfigAction::Path => commands::config::path()?,
            ConfigAction::Init { global, force } => commands::config::init(global, force)?,
        },
        Commands::Catalog { kind, format } => {
            let ctx = CommandContext::load(config_path)?;
            commands::catalog::run(&ctx, kind, format == "json")?;
        }
        Commands::Compile { spec } => {
            let ctx = CommandContext::load(config_path)?;
            commands::compile::run(&ctx, &spec)?;
        }
        Commands::Score {
            spec,
            prompt_file,
            ai,
        } => {
            let ctx = CommandContext::load(config_path)?;
            block_on(commands::score::run(&ctx, &spec, prompt_file.as_deref(), ai))?;
        }
        Commands::Generate { spec, format } => {
            let ctx = CommandContext::load(config_path)?;
            block_on(commands::generate::run(&ctx, &spec, format == "json"))?;
        }
        Commands::Ape {
            spec,
            ranked,
            format,
        } => {
            let ctx = CommandContext::load(config_path)?;
            block_on(commands::ape::run(&ctx, &spec, ranked, format == "json"))?;
        }
        Commands::Run { spec, show_prompt } => {
            let ctx = CommandContext::load(config_path)?;
            block_on(commands::run::run(&ctx, &spec, show_prompt))?;
        }
        Commands::Chain { file } => {
            let ctx = CommandContext::load(config_path)?;
            block_on(commands::chain::run(&ctx, &file))?;
        }
        Commands::History { action } => {
            let ctx = CommandContext::load(config_path)?;
            run_history(&ctx, action)?;
        }
        Commands::Usage { action } => {
            let ctx = CommandContext::load(config_path)?;
            match action {
                UsageAction::List { limit, format } => {
                    commands::usage::list(&ctx, limit, format == "json")?
                }
                UsageAction::Summary { format } => {
                    commands::usage::summary(&ctx, format == "json")?
                }
            }
        }
    }

    Ok(())
}

fn run_history(ctx: &CommandContext, action: HistoryAction) -> anyhow::Result<()> {
    match action {
        HistoryAction::List {
            kind,
            limit,
            format,
        } => commands::history::list(ctx, kind, limit, format == "json")?,
        HistoryAction::Show { id, format } => {
            commands::history::show(ctx, &id, format == "json")?
        }
        HistoryAction::Delete { id } => commands::history::delete(ctx, &id)?,
        HistoryAction::Rename { id, name } => commands::history::rename(ctx, &id, &name)?,
    }
    Ok(())
}

fn block_on<F, T>(future: F) -> anyhow::Result<T>
where
    F: std::future::Future<Output = promptcopilot::Result<T>>,
{
    let rt = Runtime::new()?;
    Ok(rt.block_on(future)?)
}
