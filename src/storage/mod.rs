//! # Storage Layer
//!
//! Configuration loading and in-place editing of scanned files.
//!
//! ## Files
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Project config | TOML (or YAML) | `.snitch.toml` / `.snitch.yaml` at the repository root |
//! | Global config | TOML | `~/.config/snitch/config.toml` |
//! | Tracker plugins | executables | `.snitch/plugins/snitch-tracker-*` |
//!
//! ## Concurrency Safety
//!
//! - [`rewrite_lines`] holds an exclusive `fs2` lock on the file it edits
//! - All writes are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`Project`] - Repository root plus its configuration
//! - [`Config`] - Project and global configuration
//! - [`update`] / [`remove`] - Rewrite or delete an annotation in place

mod config;
mod project;
mod rewrite;

pub use config::{
    Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, TrackerConfig,
    PROJECT_CONFIG_FILES,
};
pub use project::{Project, ProjectError};
pub use rewrite::{remove, rewrite_lines, update, LineEdit, RewriteError};
