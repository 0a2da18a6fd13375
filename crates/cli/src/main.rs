//! Threadline CLI: the main entry point.
//!
//! Commands:
//! - `serve`   : Start the HTTP gateway
//! - `ask`     : Answer one question, optionally continuing from a state token
//! - `chat`    : Interactive conversation threaded through local state tokens
//! - `doctor`  : Check configuration and backend readiness
//! - `config`  : Print the default config, its path, or validate it
//! - `completions` : Print a shell completion script

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

mod commands;

#[derive(Parser)]
#[command(
    name = "threadline",
    about = "Threadline: stateless retrieval-augmented Q&A",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.threadline/config.toml)
    #[arg(short, long, global = true, env = "THREADLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question
    Ask {
        question: String,

        /// State token returned by a previous answer
        #[arg(short, long)]
        state: Option<String>,

        /// Do not publish this exchange to the audit channel
        #[arg(long)]
        no_audit: bool,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Chat interactively
    Chat {
        /// Do not publish exchanges to the audit channel
        #[arg(long)]
        no_audit: bool,
    },

    /// Diagnose configuration and backends
    Doctor,

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print a config file with every default filled in
    Default,
    /// Print the config file path
    Path,
    /// Load and validate the config file
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Ask {
            question,
            state,
            no_audit,
            json,
        } => commands::ask::run(config_path, question, state, no_audit, json).await?,
        Commands::Chat { no_audit } => commands::chat::run(config_path, no_audit).await?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
        Commands::Config { action } => match action {
            ConfigAction::Default => commands::config_cmd::print_default()?,
            ConfigAction::Path => commands::config_cmd::path(config_path)?,
            ConfigAction::Validate => commands::config_cmd::validate(config_path)?,
        },
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "threadline", &mut std::io::stdout());
        }
    }

    Ok(())
}
