//! # Workflows
//!
//! Consumers of the annotation stream.
//!
//! | Workflow | Reads | Writes |
//! |----------|-------|--------|
//! | [`list`] | every annotation | nothing |
//! | [`report`] | unreported annotations | new issue, header rewrite, git commit |
//! | [`purge`] | reported annotations | annotation removal, git commit |
//!
//! Mutating workflows never run while a walk is in flight: the stream is
//! drained by [`collect`] first, then files are edited sequentially.

mod list;
mod purge;
mod report;

use std::cmp::Reverse;

use thiserror::Error;

use crate::domain::Todo;
use crate::scan::{git::GitError, ScanError, Walk};
use crate::storage::RewriteError;
use crate::tracker::TrackerError;

pub use list::{list, ListFilter};
pub use purge::{purge, PurgeOptions};
pub use report::{report, ReportOptions};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Git(#[from] GitError),
}

/// Drains a walk, cancelling it at the first per-file error
///
/// The result is sorted by location.
pub fn collect(walk: Walk) -> Result<Vec<Todo>, ScanError> {
    let cancel = walk.canceller();
    let mut todos = Vec::new();

    for result in walk {
        match result {
            Ok(todo) => todos.push(todo),
            Err(e) => {
                log::debug!("Cancelling walk after error in {}", e.path().display());
                cancel.cancel();
                return Err(e);
            }
        }
    }

    sort_by_location(&mut todos);
    Ok(todos)
}

/// Sorts by `(filename, line)`
pub fn sort_by_location(todos: &mut [Todo]) {
    todos.sort_by(|a, b| (&a.filename, a.line).cmp(&(&b.filename, b.line)));
}

/// Sorts by urgency, most urgent first, then by location
pub fn sort_by_urgency(todos: &mut [Todo]) {
    todos.sort_by(|a, b| {
        (Reverse(a.urgency), &a.filename, a.line).cmp(&(Reverse(b.urgency), &b.filename, b.line))
    });
}
