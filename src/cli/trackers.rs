//! `snitch trackers`

use anyhow::Result;

use super::output::Output;
use crate::storage::Project;
use crate::tracker::PluginLoader;

pub fn run(output: &Output) -> Result<()> {
    let mut loader = PluginLoader::new();

    // Add project plugins directory if in a repository
    if let Ok(project) = Project::discover(std::path::Path::new(".")) {
        loader.add_plugin_dir(project.plugins_dir());
    }

    loader.discover();

    let names: Vec<String> = loader.list().iter().map(|p| p.name.clone()).collect();
    let mut rows = Vec::with_capacity(names.len());
    for name in &names {
        let path = loader
            .get(name)
            .map(|p| p.path.display().to_string())
            .unwrap_or_default();
        let manifest = loader.get_manifest(name);
        if let Err(e) = &manifest {
            output.warn(&format!("{}: {}", name, e));
        }
        rows.push((name, path, manifest.ok().flatten()));
    }

    if output.is_json() {
        let items: Vec<_> = rows
            .iter()
            .map(|(name, path, manifest)| {
                serde_json::json!({
                    "name": name,
                    "path": path,
                    "manifest": manifest,
                })
            })
            .collect();
        output.data(&items);
    } else if rows.is_empty() {
        println!("No tracker plugins found.");
        println!();
        println!("Plugins are discovered from:");
        println!("  - .snitch/plugins/ directory");
        println!("  - PATH (executables starting with 'snitch-tracker-')");
    } else {
        println!("{:<16} {:<10} {:<20} {}", "NAME", "VERSION", "HOST", "PATH");
        println!("{}", "-".repeat(70));
        for (name, path, manifest) in &rows {
            match manifest {
                Some(m) => println!("{:<16} {:<10} {:<20} {}", name, m.version, m.host, path),
                None => println!("{:<16} {:<10} {:<20} {}", name, "?", "?", path),
            }
        }
    }

    Ok(())
}
