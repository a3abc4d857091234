//! Sieve CLI - sieve command

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use sieve_cli::cmd;
use sieve_cli::util;

/// Sieve - pick a diverse subset of a corpus by fuzzy fingerprints
#[derive(Parser)]
#[command(name = "sieve")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors; no progress bars or summary
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select a diverse 1/N subset and write it to the output file
    Select(cmd::select::SelectArgs),
    /// Fingerprint the corpus and rewrite the cache
    Hash(cmd::hash::HashArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    util::init_tracing(cli.verbose, cli.quiet);

    let show_progress = !cli.quiet;
    match cli.command {
        Commands::Select(args) => cmd::select::run(args, show_progress).await,
        Commands::Hash(args) => cmd::hash::run(args, show_progress).await,
    }
}
