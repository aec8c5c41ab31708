//! Listing workflow

use super::sort_by_urgency;
use crate::domain::Todo;

/// Which annotations to list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFilter {
    #[default]
    All,
    Reported,
    Unreported,
}

impl ListFilter {
    pub fn accepts(self, todo: &Todo) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::Reported => todo.is_reported(),
            ListFilter::Unreported => !todo.is_reported(),
        }
    }
}

/// Filters annotations and orders them most urgent first
pub fn list(todos: Vec<Todo>, filter: ListFilter) -> Vec<Todo> {
    let mut todos: Vec<Todo> = todos.into_iter().filter(|t| filter.accepts(t)).collect();
    sort_by_urgency(&mut todos);
    todos
}
