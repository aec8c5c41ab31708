//! Git collaborator
//!
//! Thin wrappers over the `git` binary: tracked file listing, committing a
//! reported or removed annotation, and reading remote URLs. Every command
//! line is logged at debug level before it runs.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::domain::Todo;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` failed: {stderr}")]
    Failed { command: String, stderr: String },

    #[error("Refusing to commit unreported annotation at {0}")]
    Unreported(String),
}

/// Runs git in `dir` and returns its stdout
fn run<I, S>(dir: &Path, args: I) -> Result<Vec<u8>, GitError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new("git");
    cmd.current_dir(dir).args(args);
    let command = command_line(&cmd);
    log::debug!("[CMD] {}", command);

    let output = cmd.output().map_err(|source| GitError::Spawn {
        command: command.clone(),
        source,
    })?;

    if !output.status.success() {
        return Err(GitError::Failed {
            command,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output.stdout)
}

/// Renders a command for logs, quoting arguments that contain spaces
fn command_line(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|arg| {
            let arg = arg.to_string_lossy();
            if arg.contains(' ') {
                format!("\"{}\"", arg)
            } else {
                arg.into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lists tracked files under `root`, as paths usable from the current directory
pub fn ls_files(root: &Path) -> Result<Vec<PathBuf>, GitError> {
    let stdout = run(root, ["ls-files", "-z"])?;

    Ok(stdout
        .split(|b| *b == 0)
        .filter(|entry| !entry.is_empty())
        .map(|entry| join_root(root, &String::from_utf8_lossy(entry)))
        .collect())
}

fn join_root(root: &Path, relative: &str) -> PathBuf {
    if root == Path::new(".") || root.as_os_str().is_empty() {
        PathBuf::from(relative)
    } else {
        root.join(relative)
    }
}

/// Finds the enclosing repository root by looking for `.git`
pub fn find_root(start: &Path) -> Option<PathBuf> {
    let start = fs::canonicalize(start).ok()?;

    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Returns the URL of a named remote
pub fn remote_url(root: &Path, remote: &str) -> Result<String, GitError> {
    let stdout = run(root, ["remote", "get-url", remote])?;
    Ok(String::from_utf8_lossy(&stdout).trim().to_string())
}

/// Commits the file holding `todo` with message `<prefix> <KEYWORD>(<id>)`
pub fn commit_todo(todo: &Todo, prefix: &str) -> Result<(), GitError> {
    let id = todo
        .id
        .as_deref()
        .ok_or_else(|| GitError::Unreported(todo.log_string()))?;

    let (dir, name) = split_path(&todo.filename);
    let message = format!("{} {}({})", prefix, todo.keyword, id);

    run(&dir, [OsStr::new("add"), OsStr::new("--"), name.as_os_str()])?;
    run(&dir, [OsStr::new("commit"), OsStr::new("-m"), OsStr::new(&message)])?;

    Ok(())
}

fn split_path(path: &Path) -> (PathBuf, PathBuf) {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| path.to_path_buf());

    (dir, name)
}

/// Extracts `owner/project` from a remote URL pointing at `host`
///
/// Accepts `https://host/a/b(.git)`, `ssh://user@host:port/a/b.git` and
/// scp-like `user@host:a/b.git`. `host` may include a port.
pub fn repo_from_remote_url(host: &str, url: &str) -> Option<String> {
    let rest = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => url,
    };

    // Drop userinfo, but only when it comes before the first path separator.
    let rest = match rest.find('@') {
        Some(at) if !rest[..at].contains('/') => &rest[at + 1..],
        _ => rest,
    };

    let rest = rest.strip_prefix(host)?;
    let rest = if let Some(after) = rest.strip_prefix(':') {
        let digits = after.chars().take_while(char::is_ascii_digit).count();
        if digits > 0 && after[digits..].starts_with('/') {
            &after[digits..]
        } else {
            after
        }
    } else if rest.starts_with('/') {
        rest
    } else {
        return None;
    };

    let repo = rest.trim_start_matches('/').trim_end_matches('/');
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    let repo = repo.trim_end_matches('/');

    if repo.is_empty() {
        None
    } else {
        Some(repo.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_from_remote_url_variants() {
        let host = "github.com";
        let cases = [
            ("https://bitbucket.org/user/project.git", None),
            ("https://github.com/user/project", Some("user/project")),
            ("https://github.com/user/project/", Some("user/project")),
            ("https://github.com/user/project.git", Some("user/project")),
            (
                "https://github.com/user/project.with.dot.git",
                Some("user/project.with.dot"),
            ),
            (
                "https://github.com/long/path/to/project",
                Some("long/path/to/project"),
            ),
            (
                "https://github.com/long/path/to/project.git",
                Some("long/path/to/project"),
            ),
            (
                "https://github.com/long/path/to/project.git/",
                Some("long/path/to/project"),
            ),
            ("ssh://git@github.com:22/user/project.git", Some("user/project")),
            (
                "ssh://git@github.com:22/long/path/to/project.git",
                Some("long/path/to/project"),
            ),
            ("ssh://git@github.com:user/project.git", Some("user/project")),
            ("git@github.com:user/project.git", Some("user/project")),
            ("https://github.company.com/user/project", None),
            ("https://github.com/", None),
        ];

        for (url, expected) in cases {
            assert_eq!(
                repo_from_remote_url(host, url).as_deref(),
                expected,
                "url: {}",
                url
            );
        }
    }

    #[test]
    fn repo_from_remote_url_with_port_in_host() {
        assert_eq!(
            repo_from_remote_url("gitea.com:80", "https://gitea.com:80/user/path.git").as_deref(),
            Some("user/path")
        );
    }

    #[test]
    fn command_line_quotes_spaces() {
        let mut cmd = Command::new("git");
        cmd.args(["commit", "-m", "Add TODO(#1)"]);
        assert_eq!(command_line(&cmd), "git commit -m \"Add TODO(#1)\"");
    }

    #[test]
    fn join_root_keeps_relative_paths() {
        assert_eq!(join_root(Path::new("."), "src/a.rs"), PathBuf::from("src/a.rs"));
        assert_eq!(
            join_root(Path::new("repo"), "src/a.rs"),
            PathBuf::from("repo/src/a.rs")
        );
    }

    #[test]
    fn split_path_defaults_to_current_dir() {
        assert_eq!(
            split_path(Path::new("main.rs")),
            (PathBuf::from("."), PathBuf::from("main.rs"))
        );
        assert_eq!(
            split_path(Path::new("src/main.rs")),
            (PathBuf::from("src"), PathBuf::from("main.rs"))
        );
    }

    #[test]
    fn commit_refuses_unreported() {
        let todo = Todo {
            prefix: "// ".to_string(),
            keyword: "TODO".to_string(),
            urgency: 0,
            id: None,
            title: "x".to_string(),
            suffix: "x".to_string(),
            body: vec![],
            filename: PathBuf::from("a.rs"),
            line: 1,
        };

        assert!(matches!(commit_todo(&todo, "Add"), Err(GitError::Unreported(_))));
    }
}
