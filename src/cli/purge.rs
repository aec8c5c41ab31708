//! `snitch purge`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::output::Output;
use super::session::Session;
use crate::workflow::{self, PurgeOptions};

#[derive(Args)]
pub struct PurgeArgs {
    /// Directory to scan (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Tracker plugin to use (overrides configuration)
    #[arg(long, env = "SNITCH_TRACKER")]
    pub tracker: Option<String>,

    /// Repository identifier, e.g. owner/project
    #[arg(long)]
    pub repo: Option<String>,

    /// Commit message prefix
    #[arg(long, default_value = "Remove")]
    pub prefix: String,

    /// Remove annotations but do not commit
    #[arg(long)]
    pub no_commit: bool,

    /// Show what would be removed without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: PurgeArgs, output: &Output) -> Result<()> {
    let session = Session::open(&args.path, output)?;
    let tracker = session.tracker(args.tracker.as_deref(), output)?;
    let repo = session.repo(args.repo.as_deref(), &tracker)?;
    output.verbose_ctx(
        "purge",
        &format!("repo={}, dry_run={}", repo, args.dry_run),
    );

    let options = PurgeOptions {
        repo,
        commit_prefix: (!args.no_commit).then_some(args.prefix),
        dry_run: args.dry_run,
    };
    let label = if options.dry_run { "[WOULD REMOVE]" } else { "[REMOVED]" };

    let todos = session.scan(output)?;
    let removed = workflow::purge(todos, &tracker, &options, |todo| {
        output.success(&format!("{} {}", label, todo.log_string()));
    })
    .context("Purging stopped")?;

    if output.is_json() {
        output.todos(&removed);
    } else if removed.is_empty() {
        println!("Nothing to purge.");
    }

    Ok(())
}
