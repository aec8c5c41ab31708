//! CLI integration tests for snitch
//!
//! Every test builds a throwaway git repository, commits a few files and
//! runs the real binary against it.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Get a command instance for the snitch binary, isolated from user config
fn snitch_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("snitch"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("SNITCH_TRACKER");
    cmd
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .current_dir(dir)
        .args(args)
        .status()
        .unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

/// Create a git repository with the given files committed
fn setup_repo(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    git(dir.path(), &["init", "-q"]);
    git(dir.path(), &["config", "user.email", "dev@example.com"]);
    git(dir.path(), &["config", "user.name", "Dev"]);
    git(dir.path(), &["config", "commit.gpgsign", "false"]);

    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    git(dir.path(), &["add", "-A"]);
    git(dir.path(), &["commit", "-q", "-m", "init"]);
    dir
}

const MAIN_RS: &str = "\
fn main() {
    // TODO: handle errors
    //   properly this time
    run();
    // TODOOO(#7): very urgent and filed
}
";

const NOTES_TXT: &str = "\
TODO: write docs
FIXME: not a default keyword
";

// =============================================================================
// List Tests
// =============================================================================

#[test]
fn test_list_text_sorted_by_urgency() {
    let repo = setup_repo(&[("src/main.rs", MAIN_RS), ("notes.txt", NOTES_TXT)]);

    snitch_cmd(repo.path())
        .current_dir(repo.path())
        .arg("list")
        .assert()
        .success()
        .stdout(
            "src/main.rs:5:     // TODOOO(#7): very urgent and filed\n\
             notes.txt:1: TODO: write docs\n\
             src/main.rs:2:     // TODO: handle errors\n",
        );
}

#[test]
fn test_list_filters() {
    let repo = setup_repo(&[("src/main.rs", MAIN_RS)]);

    snitch_cmd(repo.path())
        .current_dir(repo.path())
        .args(["list", "--reported"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TODOOO(#7)"))
        .stdout(predicate::str::contains("handle errors").not());

    snitch_cmd(repo.path())
        .current_dir(repo.path())
        .args(["list", "--unreported"])
        .assert()
        .success()
        .stdout(predicate::str::contains("handle errors"))
        .stdout(predicate::str::contains("TODOOO(#7)").not());
}

#[test]
fn test_list_json_format() {
    let repo = setup_repo(&[("src/main.rs", MAIN_RS)]);

    let output = snitch_cmd(repo.path())
        .current_dir(repo.path())
        .args(["--format", "json", "list", "--unreported"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["suffix"], "handle errors");
    assert_eq!(items[0]["prefix"], "    // ");
    assert_eq!(items[0]["line"], 2);
    assert_eq!(items[0]["body"][0], "  properly this time");
    assert!(items[0].get("id").is_none());
}

#[test]
fn test_list_uses_project_keywords() {
    let repo = setup_repo(&[
        ("notes.txt", NOTES_TXT),
        (".snitch.toml", "keywords = [\"FIXME\"]\n"),
    ]);

    snitch_cmd(repo.path())
        .current_dir(repo.path())
        .arg("list")
        .assert()
        .success()
        .stdout("notes.txt:2: FIXME: not a default keyword\n");
}

#[test]
fn test_list_ignores_untracked_files() {
    let repo = setup_repo(&[("notes.txt", NOTES_TXT)]);
    fs::write(repo.path().join("scratch.txt"), "TODO: untracked\n").unwrap();

    snitch_cmd(repo.path())
        .current_dir(repo.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("write docs"))
        .stdout(predicate::str::contains("untracked").not());
}

#[test]
fn test_list_subdirectory_path() {
    let repo = setup_repo(&[("src/main.rs", MAIN_RS), ("notes.txt", NOTES_TXT)]);

    snitch_cmd(repo.path())
        .current_dir(repo.path())
        .args(["list", "src"])
        .assert()
        .success()
        .stdout(predicate::str::contains("src/main.rs:2:"))
        .stdout(predicate::str::contains("notes.txt").not());
}

#[test]
fn test_list_empty_repository() {
    let repo = setup_repo(&[("README", "nothing to see\n")]);

    snitch_cmd(repo.path())
        .current_dir(repo.path())
        .arg("list")
        .assert()
        .success()
        .stdout("");
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_not_in_repository_error() {
    let dir = TempDir::new().unwrap();

    snitch_cmd(dir.path())
        .current_dir(dir.path())
        .env("GIT_CEILING_DIRECTORIES", dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Not inside a git repository"));
}

#[test]
fn test_invalid_config_error() {
    let repo = setup_repo(&[(".snitch.toml", "[title]\ntransforms = [{ match = \"(\" }]\n")]);

    snitch_cmd(repo.path())
        .current_dir(repo.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains(".snitch.toml"));
}

#[test]
fn test_report_without_tracker_fails() {
    let repo = setup_repo(&[("notes.txt", NOTES_TXT)]);

    snitch_cmd(repo.path())
        .current_dir(repo.path())
        .args(["report", "--repo", "me/project"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No issue tracker configured"));

    // Nothing was rewritten
    assert_eq!(
        fs::read_to_string(repo.path().join("notes.txt")).unwrap(),
        NOTES_TXT
    );
}

#[test]
fn test_unknown_tracker_fails() {
    let repo = setup_repo(&[("notes.txt", NOTES_TXT)]);

    snitch_cmd(repo.path())
        .current_dir(repo.path())
        .args(["purge", "--tracker", "does-not-exist", "--repo", "me/project"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tracker plugin not found: does-not-exist"));
}

// =============================================================================
// Misc Tests
// =============================================================================

#[test]
fn test_verbose_flag() {
    let repo = setup_repo(&[("notes.txt", NOTES_TXT)]);

    snitch_cmd(repo.path())
        .current_dir(repo.path())
        .args(["--verbose", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[verbose"))
        .stderr(predicate::str::contains("[CMD] git ls-files -z"));
}

#[test]
fn test_trackers_empty() {
    let repo = setup_repo(&[("notes.txt", NOTES_TXT)]);
    let empty_path = TempDir::new().unwrap();

    snitch_cmd(repo.path())
        .current_dir(repo.path())
        .env("PATH", empty_path.path())
        .arg("trackers")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tracker plugins found."));
}

#[cfg(target_os = "linux")]
#[test]
fn test_global_default_format() {
    let repo = setup_repo(&[("notes.txt", NOTES_TXT)]);
    let config_dir = repo.path().join(".config").join("snitch");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "default_format = \"json\"\n").unwrap();

    let output = snitch_cmd(repo.path())
        .current_dir(repo.path())
        .arg("list")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
}
