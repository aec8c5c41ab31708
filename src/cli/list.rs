//! `snitch list`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::output::Output;
use super::session::Session;
use crate::workflow::{self, ListFilter};

#[derive(Args)]
pub struct ListArgs {
    /// Directory to scan (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Only annotations that already have an issue
    #[arg(long, conflicts_with = "unreported")]
    pub reported: bool,

    /// Only annotations without an issue
    #[arg(long)]
    pub unreported: bool,
}

impl ListArgs {
    fn filter(&self) -> ListFilter {
        if self.reported {
            ListFilter::Reported
        } else if self.unreported {
            ListFilter::Unreported
        } else {
            ListFilter::All
        }
    }
}

pub fn run(args: ListArgs, output: &Output) -> Result<()> {
    let session = Session::open(&args.path, output)?;
    let filter = args.filter();
    output.verbose_ctx("list", &format!("filter={:?}", filter));

    let todos = workflow::list(session.scan(output)?, filter);
    output.todos(&todos);

    Ok(())
}
