//! Roster CLI - reviewer assignment service
//!
//! Runs the HTTP server and offers a few maintenance commands against the
//! same SQLite database.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roster_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{MigrateArgs, ServeArgs, StatsArgs};

/// Roster: assign code reviewers to pull requests within a team
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// SQLite database file (overrides config and env)
    #[arg(long, global = true, env = "ROSTER_DATABASE_PATH")]
    database: Option<PathBuf>,

    /// Reviewer selection strategy: random or least_loaded
    #[arg(long, global = true, env = "ROSTER_STRATEGY")]
    strategy: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Run the HTTP server
    #[command(visible_alias = "s")]
    Serve(ServeArgs),

    /// Apply database migrations and exit
    Migrate(MigrateArgs),

    /// Print reviewer assignment statistics
    Stats(StatsArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load configuration with overrides
    let config = Config::load_with_overrides(None, cli.database.clone(), cli.strategy.clone())?;

    if cli.verbose {
        tracing::info!(
            address = %config.server.address,
            database = %config.database.resolved_path().display(),
            strategy = config.assignment.strategy.as_str(),
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("roster {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve(args)) => {
            args.execute(config).await?;
        }
        Some(Commands::Migrate(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Stats(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Config) => {
            println!("Roster Configuration");
            println!("====================");
            println!();
            println!("Server:");
            println!("  address: {}", config.server.address);
            println!("  request_timeout: {:?}", config.server.request_timeout);
            println!("  shutdown_timeout: {:?}", config.server.shutdown_timeout);
            println!();
            println!("Database:");
            println!("  path: {}", config.database.resolved_path().display());
            println!("  max_connections: {}", config.database.max_connections);
            println!();
            println!("Assignment:");
            println!("  strategy: {}", config.assignment.strategy.as_str());
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("Roster - code reviewer assignment for team pull requests");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
