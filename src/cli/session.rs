//! Shared command setup: project discovery, scanning and tracker selection

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::{Classifier, Todo};
use crate::scan;
use crate::storage::Project;
use crate::tracker::{IssueTracker, PluginLoader, PluginTracker, TrackerError};
use crate::workflow;

/// A project opened for one command
pub struct Session {
    project: Project,
    classifier: Arc<Classifier>,
    scan_root: PathBuf,
}

impl Session {
    /// Opens the repository enclosing `path`; only `path` is scanned
    pub fn open(path: &Path, output: &Output) -> Result<Self> {
        let project = Project::discover(path)
            .with_context(|| format!("Failed to open project at {}", path.display()))?;
        let classifier = project.classifier()?;

        output.verbose_ctx(
            "config",
            &format!(
                "root={}, config={}, keywords={:?}",
                project.root().display(),
                project
                    .config()
                    .project_file
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<defaults>".to_string()),
                classifier.keywords().collect::<Vec<_>>()
            ),
        );

        Ok(Self {
            project,
            classifier,
            scan_root: path.to_path_buf(),
        })
    }

    /// Walks the scan root and returns every annotation sorted by location
    pub fn scan(&self, output: &Output) -> Result<Vec<Todo>> {
        let walk = scan::walk(&self.scan_root, Arc::clone(&self.classifier))?;
        let todos = workflow::collect(walk)?;

        output.verbose_ctx("scan", &format!("Found {} annotations", todos.len()));
        Ok(todos)
    }

    /// Resolves the tracker plugin: flag, then project config, then global config
    pub fn tracker(&self, flag: Option<&str>, output: &Output) -> Result<PluginTracker> {
        let name = flag
            .or_else(|| self.project.config().tracker_plugin())
            .context("No issue tracker configured. Pass --tracker or set [tracker] plugin in .snitch.toml")?;

        let mut loader = PluginLoader::new();
        loader.add_plugin_dir(self.project.plugins_dir());
        loader.discover();

        let info = loader
            .get(name)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(name.to_string()))?;
        output.verbose_ctx("tracker", &format!("{} -> {}", name, info.path.display()));

        Ok(PluginTracker::new(info)?)
    }

    /// Resolves the repository id: flag, then config, then the git remote
    pub fn repo(&self, flag: Option<&str>, tracker: &dyn IssueTracker) -> Result<String> {
        if let Some(repo) = flag {
            return Ok(repo.to_string());
        }

        self.project.repo_id(tracker.host()).with_context(|| {
            format!(
                "Could not determine the {} repository. Pass --repo or set [tracker] repo",
                tracker.name()
            )
        })
    }
}
