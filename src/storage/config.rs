//! Configuration handling for snitch
//!
//! Configuration is stored in `.snitch.toml` at the repository root
//! (`.snitch.yaml` / `.snitch.yml` are also accepted) and in
//! `~/.config/snitch/config.toml` (global).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    AnnotationConfig, Classifier, ClassifierError, TitleConfig, DEFAULT_BODY_SEPARATOR,
};

/// Project config file names, in lookup order
pub const PROJECT_CONFIG_FILES: [&str; 3] = [".snitch.toml", ".snitch.yaml", ".snitch.yml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse configuration {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ClassifierError,
    },
}

/// Issue tracker settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Plugin name, resolved to a `snitch-tracker-<plugin>` executable
    pub plugin: Option<String>,

    /// Repository identifier; derived from the git remote when absent
    pub repo: Option<String>,

    /// Git remote used to derive the repository identifier
    pub remote: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            plugin: None,
            repo: None,
            remote: "origin".to_string(),
        }
    }
}

/// Project-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Annotation keywords in priority order
    pub keywords: Vec<String>,

    /// Text that closes an annotation body
    #[serde(alias = "bodyseparator")]
    pub body_separator: String,

    /// Title derivation
    pub title: TitleConfig,

    /// Issue tracker
    pub tracker: TrackerConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            keywords: vec![],
            body_separator: DEFAULT_BODY_SEPARATOR.to_string(),
            title: TitleConfig::default(),
            tracker: TrackerConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// The annotation part of the configuration
    pub fn annotations(&self) -> AnnotationConfig {
        AnnotationConfig {
            keywords: self.keywords.clone(),
            body_separator: self.body_separator.clone(),
            title: self.title.clone(),
        }
    }
}

/// Global user configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Tracker plugin used when the project does not name one
    pub tracker: Option<String>,
}

impl GlobalConfig {
    /// Loads `config.toml` from the global config directory, if present
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = match Config::global_config_dir() {
            Some(dir) => dir.join("config.toml"),
            None => return Ok(Self::default()),
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = read(&config_path)?;
        parse_toml(&config_path, &content)
    }
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,

    /// File the project configuration was read from, if any
    pub project_file: Option<PathBuf>,
}

impl Config {
    /// Loads the global configuration and the project configuration at `root`
    pub fn for_project(root: &Path) -> Result<Self, ConfigError> {
        let global = GlobalConfig::load()?;
        let (project, project_file) = Self::load_project_config(root)?;

        Ok(Self {
            project,
            global,
            project_file,
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "snitch", "snitch").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads the first project config file found at `root`
    pub fn load_project_config(
        root: &Path,
    ) -> Result<(ProjectConfig, Option<PathBuf>), ConfigError> {
        let Some(config_path) = PROJECT_CONFIG_FILES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
        else {
            return Ok((ProjectConfig::default(), None));
        };

        log::debug!("Loading project config from {}", config_path.display());
        let content = read(&config_path)?;
        let config: ProjectConfig = if config_path.extension().is_some_and(|ext| ext == "toml") {
            parse_toml(&config_path, &content)?
        } else {
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: config_path.clone(),
                message: e.to_string(),
            })?
        };

        Ok((config, Some(config_path)))
    }

    /// Compiles the annotation settings, validating keywords and patterns
    pub fn classifier(&self) -> Result<Classifier, ConfigError> {
        Classifier::new(&self.project.annotations()).map_err(|source| ConfigError::Invalid {
            path: self.project_file.clone().unwrap_or_default(),
            source,
        })
    }

    /// Tracker plugin name: project setting first, then global
    pub fn tracker_plugin(&self) -> Option<&str> {
        self.project
            .tracker
            .plugin
            .as_deref()
            .or(self.global.tracker.as_deref())
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_toml<T: for<'de> Deserialize<'de>>(path: &Path, content: &str) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
