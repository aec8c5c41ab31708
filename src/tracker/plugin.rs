//! Issue tracker backed by a plugin executable

use serde_json::json;

use super::loader::PluginInfo;
use super::protocol::{PluginManifest, PluginRequest, PluginResponse};
use super::{IssueStatus, IssueTracker, TrackerError};
use crate::domain::Todo;

/// [`IssueTracker`] that forwards every call to a `snitch-tracker-*` plugin
#[derive(Debug, Clone)]
pub struct PluginTracker {
    info: PluginInfo,
    manifest: PluginManifest,
}

impl PluginTracker {
    /// Wraps a discovered plugin, loading its manifest if needed
    pub fn new(mut info: PluginInfo) -> Result<Self, TrackerError> {
        let manifest = match info.manifest.take() {
            Some(manifest) => manifest,
            None => info.load_manifest()?,
        };
        log::debug!(
            "Using tracker plugin {} {} ({})",
            manifest.name,
            manifest.version,
            info.path.display()
        );

        Ok(Self { info, manifest })
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn call(&self, operation: &str, params: serde_json::Value) -> Result<PluginResponse, TrackerError> {
        if !self.manifest.supports(operation) {
            return Err(TrackerError::Unsupported {
                plugin: self.info.name.clone(),
                operation: operation.to_string(),
            });
        }

        let response = self.info.execute(&PluginRequest::new(operation, params))?;
        if !response.success {
            return Err(TrackerError::Failed {
                plugin: self.info.name.clone(),
                message: response
                    .error
                    .unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        Ok(response)
    }

    fn missing(&self, operation: &str, key: &str) -> TrackerError {
        TrackerError::Protocol {
            plugin: self.info.name.clone(),
            message: format!("'{}' response has no '{}'", operation, key),
        }
    }
}

impl IssueTracker for PluginTracker {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn host(&self) -> &str {
        &self.manifest.host
    }

    fn status(&self, repo: &str, todo: &Todo) -> Result<IssueStatus, TrackerError> {
        let response = self.call("status", json!({ "repo": repo, "todo": todo }))?;
        let state = response
            .field("state")
            .ok_or_else(|| self.missing("status", "state"))?;

        Ok(IssueStatus::new(state))
    }

    fn create(&self, repo: &str, todo: &Todo, body: &str) -> Result<Todo, TrackerError> {
        let response = self.call(
            "create",
            json!({ "repo": repo, "todo": todo, "body": body }),
        )?;
        let id = response
            .field("id")
            .ok_or_else(|| self.missing("create", "id"))?;

        Ok(todo.clone().with_id(id))
    }
}
