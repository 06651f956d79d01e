//! lawdelta CLI
//!
//! Ingest statute updates and query their history from the command line.
//! Every command prints JSON on stdout; logs go to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lawdelta_core::logging_facility;

mod commands;
mod config;

#[derive(Debug, Parser)]
#[command(name = "lawdelta")]
#[command(
    about = "lawdelta - Statute change tracking and point-in-time reconstruction",
    long_about = None
)]
struct Cli {
    /// SQLite database (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// TOML configuration file [default: ./lawdelta.toml when present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log profile: development, production or test (overrides the config file)
    #[arg(long, global = true)]
    log_profile: Option<logging_facility::Profile>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply one document update read from a JSON file
    Ingest(commands::ingest::IngestArgs),
    /// Apply every JSON update in a directory with parallel workers
    IngestBatch(commands::batch::IngestBatchArgs),
    /// Amendment timeline of a document
    History(commands::query::HistoryArgs),
    /// A document as it read on a date
    Version(commands::query::VersionArgs),
    /// Section differences between two dates
    Diff(commands::query::DiffArgs),
    /// Mark a document repealed
    Repeal(commands::repeal::RepealArgs),
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = config::Settings::resolve(cli.config.as_deref(), cli.db, cli.log_profile)?;
    logging_facility::init(settings.log_profile);

    match cli.command {
        Commands::Ingest(args) => commands::ingest::execute(args, &settings),
        Commands::IngestBatch(args) => commands::batch::execute(args, &settings),
        Commands::History(args) => commands::query::execute_history(args, &settings),
        Commands::Version(args) => commands::query::execute_version(args, &settings),
        Commands::Diff(args) => commands::query::execute_diff(args, &settings),
        Commands::Repeal(args) => commands::repeal::execute(args, &settings),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
