//! SlippyTile CLI - Command-line interface
//!
//! Fetches slippy-map tiles through the disk cache, inspects and manages the
//! cache, and simulates a viewer frame against the in-memory resource cache.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;
use slippytile::config::config_file_path;
use slippytile::logging;

use commands::cache::CacheAction;
use commands::common::CliContext;
use commands::config::ConfigCommands;
use commands::fetch::{FetchArgs, LocateArgs};
use commands::view::ViewArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "slippytile")]
#[command(version, about = "Slippy-map tile fetcher with disk and in-memory caching", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the per-user config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disk cache directory, overriding cache.directory
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one tile by z/x/y
    Fetch(FetchArgs),

    /// Resolve the tile containing a latitude/longitude
    Locate(LocateArgs),

    /// Load a block of tiles into the resource cache like a viewer would
    View(ViewArgs),

    /// Manage the disk cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// View or modify configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.unwrap_or_else(config_file_path);
    let context = CliContext::load(config_path, cli.cache_dir)?;

    let mut logging_config = context.config.logging.clone();
    if cli.verbose {
        logging_config.level = "debug".to_string();
    }
    // Held until exit so the file writer flushes
    let _log_guard = logging::init(&logging_config)?;

    match cli.command {
        Commands::Fetch(args) => commands::fetch::run_fetch(&context, args),
        Commands::Locate(args) => commands::fetch::run_locate(&context, args),
        Commands::View(args) => commands::view::run(&context, args),
        Commands::Cache { action } => commands::cache::run(&context, action),
        Commands::Config { command } => commands::config::run(&context, command),
    }
}
