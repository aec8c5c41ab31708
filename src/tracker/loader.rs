//! Tracker plugin discovery and execution
//!
//! Plugins are discovered from:
//! 1. `.snitch/plugins/` and any other added directory
//! 2. PATH
//!
//! in that order, first found wins. Only executables named
//! `snitch-tracker-<name>` are considered.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::protocol::{PluginManifest, PluginRequest, PluginResponse};
use super::TrackerError;

/// File name prefix of tracker plugin executables
pub const PLUGIN_PREFIX: &str = "snitch-tracker-";

/// Information about a discovered plugin
#[derive(Debug, Clone)]
pub struct PluginInfo {
    /// Short plugin name (`github` for `snitch-tracker-github`)
    pub name: String,

    /// Path to the plugin executable
    pub path: PathBuf,

    /// Plugin manifest (loaded on demand)
    pub manifest: Option<PluginManifest>,
}

impl PluginInfo {
    /// Runs the plugin with `--manifest`
    pub fn load_manifest(&self) -> Result<PluginManifest, TrackerError> {
        log::debug!("[CMD] {} --manifest", self.path.display());
        let output = Command::new(&self.path)
            .arg("--manifest")
            .output()
            .map_err(|source| TrackerError::Spawn {
                plugin: self.name.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(TrackerError::Failed {
                plugin: self.name.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|e| TrackerError::Protocol {
            plugin: self.name.clone(),
            message: format!("invalid manifest: {}", e),
        })
    }

    /// Sends one request and reads one response line
    pub fn execute(&self, request: &PluginRequest) -> Result<PluginResponse, TrackerError> {
        let request_json = serde_json::to_string(request).map_err(|e| TrackerError::Protocol {
            plugin: self.name.clone(),
            message: format!("failed to serialize request: {}", e),
        })?;

        log::debug!("[CMD] {} <<< {}", self.path.display(), request.operation);
        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TrackerError::Spawn {
                plugin: self.name.clone(),
                source,
            })?;

        // Dropping stdin signals end of input to the plugin.
        if let Some(mut stdin) = child.stdin.take() {
            writeln!(stdin, "{}", request_json).map_err(|source| TrackerError::Io {
                plugin: self.name.clone(),
                source,
            })?;
        }

        let output = child.wait_with_output().map_err(|source| TrackerError::Io {
            plugin: self.name.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let Some(line) = stdout.lines().find(|line| !line.trim().is_empty()) else {
            return Err(TrackerError::Protocol {
                plugin: self.name.clone(),
                message: format!(
                    "no response ({}): {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        };

        serde_json::from_str(line).map_err(|e| TrackerError::Protocol {
            plugin: self.name.clone(),
            message: format!("invalid response: {}", e),
        })
    }
}

/// Plugin loader
pub struct PluginLoader {
    /// Discovered plugins by short name
    plugins: BTreeMap<String, PluginInfo>,

    /// Plugin directories searched before PATH
    plugin_dirs: Vec<PathBuf>,
}

impl PluginLoader {
    /// Creates a new plugin loader
    pub fn new() -> Self {
        Self {
            plugins: BTreeMap::new(),
            plugin_dirs: Vec::new(),
        }
    }

    /// Adds a plugin directory to search
    pub fn add_plugin_dir(&mut self, dir: impl Into<PathBuf>) {
        self.plugin_dirs.push(dir.into());
    }

    /// Discovers all available plugins
    pub fn discover(&mut self) {
        self.plugins.clear();

        for dir in self.plugin_dirs.clone() {
            self.scan_directory(&dir);
        }

        if let Some(path_var) = std::env::var_os("PATH") {
            for dir in std::env::split_paths(&path_var) {
                self.scan_directory(&dir);
            }
        }

        log::debug!("Discovered {} tracker plugins", self.plugins.len());
    }

    fn scan_directory(&mut self, dir: &Path) {
        // Unreadable directories are ignored
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(plugin_name)
            else {
                continue;
            };

            if is_executable(&path) && !self.plugins.contains_key(name) {
                let name = name.to_string();
                self.plugins.insert(
                    name.clone(),
                    PluginInfo {
                        name,
                        path,
                        manifest: None,
                    },
                );
            }
        }
    }

    /// Lists all discovered plugins, sorted by name
    pub fn list(&self) -> Vec<&PluginInfo> {
        self.plugins.values().collect()
    }

    /// Gets a plugin by short or full executable name
    pub fn get(&self, name: &str) -> Option<&PluginInfo> {
        let short = name.strip_prefix(PLUGIN_PREFIX).unwrap_or(name);
        self.plugins.get(short)
    }

    /// Gets the manifest for a plugin (loads if needed)
    pub fn get_manifest(&mut self, name: &str) -> Result<Option<PluginManifest>, TrackerError> {
        let short = name.strip_prefix(PLUGIN_PREFIX).unwrap_or(name);
        let Some(info) = self.plugins.get_mut(short) else {
            return Ok(None);
        };

        if info.manifest.is_none() {
            info.manifest = Some(info.load_manifest()?);
        }
        Ok(info.manifest.clone())
    }
}

impl Default for PluginLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Short plugin name from an executable file name
fn plugin_name(file_name: &str) -> Option<&str> {
    let name = file_name.strip_prefix(PLUGIN_PREFIX)?;
    let name = name.strip_suffix(".exe").unwrap_or(name);
    (!name.is_empty()).then_some(name)
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = path.metadata() {
            return meta.is_file() && meta.permissions().mode() & 0o111 != 0;
        }
    }

    #[cfg(windows)]
    {
        if let Some(ext) = path.extension() {
            return ext == "exe" || ext == "bat" || ext == "cmd";
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn new_loader_is_empty() {
        let loader = PluginLoader::new();
        assert!(loader.list().is_empty());
    }

    #[test]
    fn plugin_names() {
        assert_eq!(plugin_name("snitch-tracker-github"), Some("github"));
        assert_eq!(plugin_name("snitch-tracker-gitea.exe"), Some("gitea"));
        assert_eq!(plugin_name("snitch-tracker-"), None);
        assert_eq!(plugin_name("shape-sync-github"), None);
    }

    #[test]
    fn discover_empty_dir() {
        let dir = TempDir::new().unwrap();
        let mut loader = PluginLoader::new();
        loader.add_plugin_dir(dir.path());
        loader.discover();

        assert!(loader.get("github").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn discover_executables_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let exec = dir.path().join("snitch-tracker-zzlocal");
        fs::write(&exec, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&exec, fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(dir.path().join("snitch-tracker-zznoexec"), "").unwrap();
        fs::write(dir.path().join("unrelated"), "").unwrap();

        let mut loader = PluginLoader::new();
        loader.add_plugin_dir(dir.path());
        loader.discover();

        let found = loader.get("zzlocal").unwrap();
        assert_eq!(found.path, exec);
        assert!(loader.get("snitch-tracker-zzlocal").is_some());
        assert!(loader.get("zznoexec").is_none());
    }

    #[test]
    fn get_nonexistent_plugin() {
        let mut loader = PluginLoader::new();
        assert!(loader.get("nonexistent").is_none());
        assert!(loader.get_manifest("nonexistent").unwrap().is_none());
    }
}
