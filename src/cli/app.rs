//! Main CLI application structure

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{list, purge, report, trackers};
use crate::storage::GlobalConfig;

#[derive(Parser)]
#[command(name = "snitch")]
#[command(author, version, about = "Find TODO annotations in a git repository and turn them into issues")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List annotations, most urgent first
    List(list::ListArgs),

    /// File issues for unreported annotations
    Report(report::ReportArgs),

    /// Remove annotations whose issues are closed
    Purge(purge::PurgeArgs),

    /// List available tracker plugins
    Trackers,
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let global = GlobalConfig::load().context("Failed to load global configuration")?;
    let format = cli.format.unwrap_or_else(|| global.default_format.into());
    let output = Output::new(format, cli.verbose);

    output.verbose("snitch starting");

    match cli.command {
        Commands::List(args) => list::run(args, &output)?,
        Commands::Report(args) => report::run(args, &output)?,
        Commands::Purge(args) => purge::run(args, &output)?,
        Commands::Trackers => trackers::run(&output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
