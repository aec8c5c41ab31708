//! # Issue Trackers
//!
//! The port through which workflows talk to an external issue tracker.
//!
//! ## Plugins
//!
//! Concrete trackers are separate executables named `snitch-tracker-{name}`
//! that communicate via JSON over stdin/stdout, so they can be written in
//! any language.
//!
//! ```text
//! snitch                          Plugin Binary
//!  │                               │
//!  ├── Spawn: snitch-tracker-github│
//!  │                               │
//!  ├── Stdin: {"operation": "create", "params": {"repo", "todo", "body"}}
//!  │                               │
//!  └── Stdout: {"success": true, "data": {"id": "#42"}}
//! ```
//!
//! | Operation | Params | Data |
//! |-----------|--------|------|
//! | `status` | `repo`, `todo` | `state` |
//! | `create` | `repo`, `todo`, `body` | `id` |
//!
//! Every plugin must support `--manifest` to declare its name, version,
//! host and operations.

mod loader;
mod plugin;
mod protocol;

use std::io;

use thiserror::Error;

use crate::domain::Todo;

pub use loader::{PluginInfo, PluginLoader, PLUGIN_PREFIX};
pub use plugin::PluginTracker;
pub use protocol::{PluginManifest, PluginRequest, PluginResponse};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Tracker plugin not found: {0}")]
    NotFound(String),

    #[error("Failed to run tracker plugin '{plugin}': {source}")]
    Spawn {
        plugin: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error talking to tracker plugin '{plugin}': {source}")]
    Io {
        plugin: String,
        #[source]
        source: io::Error,
    },

    #[error("Tracker plugin '{plugin}' sent a bad response: {message}")]
    Protocol { plugin: String, message: String },

    #[error("Tracker plugin '{plugin}' failed: {message}")]
    Failed { plugin: String, message: String },

    #[error("Tracker plugin '{plugin}' does not support '{operation}'")]
    Unsupported { plugin: String, operation: String },
}

/// State of an issue as reported by the tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueStatus {
    pub state: String,
}

impl IssueStatus {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
        }
    }

    /// Only `closed` is interpreted; every other state keeps the annotation
    pub fn is_closed(&self) -> bool {
        self.state.eq_ignore_ascii_case("closed")
    }
}

/// An external issue tracker
pub trait IssueTracker {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Host used to derive repository identifiers from git remotes
    fn host(&self) -> &str;

    /// Fetches the state of the issue referenced by a reported annotation
    fn status(&self, repo: &str, todo: &Todo) -> Result<IssueStatus, TrackerError>;

    /// Files a new issue and returns the annotation with its id set
    fn create(&self, repo: &str, todo: &Todo, body: &str) -> Result<Todo, TrackerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_closed_is_closed() {
        assert!(IssueStatus::new("closed").is_closed());
        assert!(IssueStatus::new("Closed").is_closed());
        assert!(!IssueStatus::new("open").is_closed());
        assert!(!IssueStatus::new("").is_closed());
    }
}
