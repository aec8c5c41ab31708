//! `snitch report`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::output::Output;
use super::session::Session;
use crate::workflow::{self, ReportOptions};

#[derive(Args)]
pub struct ReportArgs {
    /// Directory to scan (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Tracker plugin to use (overrides configuration)
    #[arg(long, env = "SNITCH_TRACKER")]
    pub tracker: Option<String>,

    /// Repository identifier, e.g. owner/project
    #[arg(long)]
    pub repo: Option<String>,

    /// Text appended to every issue body
    #[arg(long)]
    pub body: Option<String>,

    /// Commit message prefix
    #[arg(long, default_value = "Add")]
    pub prefix: String,

    /// Rewrite files but do not commit them
    #[arg(long)]
    pub no_commit: bool,

    /// Report at most this many annotations
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn run(args: ReportArgs, output: &Output) -> Result<()> {
    let session = Session::open(&args.path, output)?;
    let tracker = session.tracker(args.tracker.as_deref(), output)?;
    let repo = session.repo(args.repo.as_deref(), &tracker)?;
    output.verbose_ctx("report", &format!("repo={}", repo));

    let options = ReportOptions {
        repo,
        body: args.body,
        commit_prefix: (!args.no_commit).then_some(args.prefix),
        limit: args.limit,
    };

    let todos = session.scan(output)?;
    let reported = workflow::report(todos, &tracker, &options, |todo| {
        output.success(&format!("[REPORTED] {}", todo.log_string()));
    })
    .context("Reporting stopped")?;

    if output.is_json() {
        output.todos(&reported);
    } else if reported.is_empty() {
        println!("Nothing to report.");
    }

    Ok(())
}
