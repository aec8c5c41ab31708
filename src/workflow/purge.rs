//! Purging workflow
//!
//! Asks the tracker about every reported annotation and deletes the ones
//! whose issue is closed, header and body both.

use std::cmp::Reverse;

use super::WorkflowError;
use crate::domain::Todo;
use crate::scan::git;
use crate::storage;
use crate::tracker::IssueTracker;

#[derive(Debug, Clone, Default)]
pub struct PurgeOptions {
    /// Repository identifier passed to the tracker
    pub repo: String,

    /// Commit message prefix; `None` skips committing
    pub commit_prefix: Option<String>,

    /// Only report what would be removed
    pub dry_run: bool,
}

/// Removes annotations whose issues are closed
///
/// Status is fetched for every reported annotation before anything is
/// removed. Within a file, annotations are removed bottom-up so earlier
/// line numbers stay valid. Returns the removed (or removable) annotations.
pub fn purge<T, F>(
    todos: Vec<Todo>,
    tracker: &T,
    options: &PurgeOptions,
    mut on_removed: F,
) -> Result<Vec<Todo>, WorkflowError>
where
    T: IssueTracker + ?Sized,
    F: FnMut(&Todo),
{
    let mut closed = Vec::new();
    for todo in todos.into_iter().filter(Todo::is_reported) {
        let status = tracker.status(&options.repo, &todo)?;
        log::debug!("{} is {}", todo.log_string(), status.state);
        if status.is_closed() {
            closed.push(todo);
        }
    }

    closed.sort_by(|a, b| (&a.filename, Reverse(a.line)).cmp(&(&b.filename, Reverse(b.line))));

    for todo in &closed {
        if !options.dry_run {
            storage::remove(todo)?;

            if let Some(prefix) = &options.commit_prefix {
                git::commit_todo(todo, prefix)?;
            }
        }
        on_removed(todo);
    }

    Ok(closed)
}
