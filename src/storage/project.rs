//! Project discovery
//!
//! A project is a git working tree plus its snitch configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::config::{Config, ConfigError};
use crate::domain::Classifier;
use crate::scan::git;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not inside a git repository: {}", .0.display())]
    NotInRepository(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A git repository scanned by snitch
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens the project rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ProjectError> {
        let root = root.into();
        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the repository enclosing `start`
    pub fn discover(start: &Path) -> Result<Self, ProjectError> {
        let root =
            git::find_root(start).ok_or_else(|| ProjectError::NotInRepository(start.to_path_buf()))?;
        log::debug!("Repository root: {}", root.display());

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the .snitch directory path
    pub fn snitch_dir(&self) -> PathBuf {
        self.root.join(".snitch")
    }

    /// Returns the project-local tracker plugin directory
    pub fn plugins_dir(&self) -> PathBuf {
        self.snitch_dir().join("plugins")
    }

    /// Compiles the annotation configuration for sharing across workers
    pub fn classifier(&self) -> Result<Arc<Classifier>, ConfigError> {
        self.config.classifier().map(Arc::new)
    }

    /// Repository identifier for a tracker at `host`
    ///
    /// Uses the configured `tracker.repo` when set, otherwise parses the URL
    /// of the configured remote.
    pub fn repo_id(&self, host: &str) -> Option<String> {
        let tracker = &self.config.project.tracker;
        if let Some(repo) = &tracker.repo {
            return Some(repo.clone());
        }

        match git::remote_url(&self.root, &tracker.remote) {
            Ok(url) => git::repo_from_remote_url(host, &url),
            Err(e) => {
                log::debug!("No usable remote '{}': {}", tracker.remote, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fake_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        dir
    }

    #[test]
    fn discover_from_subdirectory() {
        let dir = fake_repo();
        let sub = dir.path().join("src").join("deep");
        fs::create_dir_all(&sub).unwrap();

        let project = Project::discover(&sub).unwrap();
        assert_eq!(project.root(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn plugin_dir_is_inside_snitch_dir() {
        let dir = fake_repo();
        let project = Project::open(dir.path()).unwrap();

        assert_eq!(project.plugins_dir(), dir.path().join(".snitch").join("plugins"));
    }

    #[test]
    fn configured_repo_wins() {
        let dir = fake_repo();
        fs::write(
            dir.path().join(".snitch.toml"),
            "[tracker]\nrepo = \"me/proj\"\n",
        )
        .unwrap();

        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.repo_id("github.com").as_deref(), Some("me/proj"));
    }

    #[test]
    fn invalid_config_fails_open() {
        let dir = fake_repo();
        fs::write(dir.path().join(".snitch.toml"), "keywords = 3\n").unwrap();

        assert!(matches!(
            Project::open(dir.path()),
            Err(ProjectError::Config(ConfigError::Parse { .. }))
        ));
    }

    #[test]
    fn classifier_uses_project_keywords() {
        let dir = fake_repo();
        fs::write(dir.path().join(".snitch.toml"), "keywords = [\"FIXME\"]\n").unwrap();

        let project = Project::open(dir.path()).unwrap();
        let classifier = project.classifier().unwrap();
        assert!(classifier.classify("// FIXME: x").is_some());
        assert!(classifier.classify("// TODO: x").is_none());
    }
}
