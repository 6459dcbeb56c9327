//! Autotag - rule-driven tagging for plain-text and Markdown notes
//!
//! Entry point for the `autotag` command-line tool.

mod cli;

use clap::{Parser, Subcommand};
use cli::{alias::AliasCommand, discover::DiscoverCommand, helpers::Context, tag::TagCommand};
use std::path::PathBuf;
use tracing::{debug, error, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "autotag")]
#[command(about = "Keep #tags in your notes in sync with declarative rules", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Rules file (overrides the configured location)
    #[arg(long, global = true, env = "AUTOTAG_RULES")]
    rules: Option<PathBuf>,

    /// Config file (defaults to <config_dir>/autotag/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tagging rules
    Tag {
        #[command(subcommand)]
        command: TagCommand,
    },

    /// Reconcile every document in a directory once
    Sync {
        /// Directory alias (or path); defaults to the default alias
        alias: Option<String>,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Reconcile documents continuously as they change
    Watch {
        alias: Option<String>,
    },

    /// Explore a corpus to help write rules
    Discover {
        #[command(subcommand)]
        command: DiscoverCommand,
    },

    /// Manage directory aliases
    Alias {
        #[command(subcommand)]
        command: AliasCommand,
    },
}

async fn run(cli: Cli) -> autotag_core::Result<()> {
    let ctx = Context::load(cli.config, cli.rules)?;

    match cli.command {
        Commands::Tag { command } => cli::tag::handle(&ctx, command),
        Commands::Sync { alias, dry_run } => cli::sync::handle(&ctx, alias, dry_run),
        Commands::Watch { alias } => cli::watch::handle(&ctx, alias).await,
        Commands::Discover { command } => cli::discover::handle(&ctx, command),
        Commands::Alias { command } => cli::alias::handle(&ctx, command),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Use specified level for autotag, but WARN for the filesystem watcher backend
    let filter = EnvFilter::new(format!(
        "autotag={level},autotag_core={level},notify=warn",
        level = level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();

    debug!("Autotag v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        if !e.is_user_error() {
            error!("Command failed: {:?}", e);
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
