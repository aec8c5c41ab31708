//! Reporting workflow
//!
//! For every unreported annotation: file an issue, rewrite the header with
//! the new id, then commit the file. The first failure stops the run; files
//! already reported stay reported.

use super::{sort_by_urgency, WorkflowError};
use crate::domain::Todo;
use crate::scan::git;
use crate::storage;
use crate::tracker::IssueTracker;

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Repository identifier passed to the tracker
    pub repo: String,

    /// Extra text appended to every issue body
    pub body: Option<String>,

    /// Commit message prefix; `None` skips committing
    pub commit_prefix: Option<String>,

    /// Report at most this many annotations
    pub limit: Option<usize>,
}

/// Reports unreported annotations, most urgent first
///
/// `on_reported` is called after each annotation has been filed and
/// rewritten. Returns the reported annotations with their new ids.
pub fn report<T, F>(
    todos: Vec<Todo>,
    tracker: &T,
    options: &ReportOptions,
    mut on_reported: F,
) -> Result<Vec<Todo>, WorkflowError>
where
    T: IssueTracker + ?Sized,
    F: FnMut(&Todo),
{
    let mut pending: Vec<Todo> = todos.into_iter().filter(|t| !t.is_reported()).collect();
    sort_by_urgency(&mut pending);
    if let Some(limit) = options.limit {
        pending.truncate(limit);
    }

    log::info!(
        "Reporting {} annotations to {} ({})",
        pending.len(),
        tracker.name(),
        options.repo
    );

    let mut reported = Vec::with_capacity(pending.len());
    for todo in pending {
        let body = todo.issue_body(options.body.as_deref());
        let filed = tracker.create(&options.repo, &todo, &body)?;
        storage::update(&filed)?;

        if let Some(prefix) = &options.commit_prefix {
            git::commit_todo(&filed, prefix)?;
        }

        on_reported(&filed);
        reported.push(filed);
    }

    Ok(reported)
}
