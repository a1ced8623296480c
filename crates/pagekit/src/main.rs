//! pagekit CLI - Confluence page toolkit.
//!
//! Provides commands for:
//! - `page get|create|update|delete`: Page CRUD with conflict-aware updates
//! - `space get|list`: Space lookup
//! - `search`: CQL search built from typed filters

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{PageCommand, SearchArgs, SpaceCommand};
use output::Output;

/// pagekit - Confluence page toolkit.
#[derive(Parser)]
#[command(name = "pagekit", version, about)]
struct Cli {
    /// Enable verbose output (log every remote call).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Page commands.
    #[command(subcommand)]
    Page(PageCommand),
    /// Space commands.
    #[command(subcommand)]
    Space(SpaceCommand),
    /// Search content with CQL.
    Search(SearchArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Page(cmd) => cmd.execute(),
        Commands::Space(cmd) => cmd.execute(),
        Commands::Search(args) => args.execute(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
