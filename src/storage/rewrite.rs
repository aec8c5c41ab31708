//! In-place file mutation
//!
//! Files are rewritten line by line into a sibling temp file which is then
//! renamed over the original. The original is held under an exclusive lock
//! for the duration and is never touched if anything fails.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

use crate::domain::Todo;

const TEMP_SUFFIX: &str = ".snitch.tmp";

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to lock {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create temp file {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy permissions to {}: {source}", path.display())]
    Permissions {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: line not found, file changed since it was scanned", path.display())]
    MissingLine { path: PathBuf, line: usize },
}

/// What to do with a single line during a rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEdit {
    Keep,
    /// Replace the line content, keeping its original terminator
    Replace(String),
    Delete,
}

/// Temp file that is removed on drop unless persisted
struct TempFile {
    path: PathBuf,
    persisted: bool,
}

impl TempFile {
    fn beside(target: &Path) -> Self {
        let mut name: OsString = target
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(TEMP_SUFFIX);

        Self {
            path: target.with_file_name(name),
            persisted: false,
        }
    }

    fn persist(mut self, target: &Path) -> Result<(), RewriteError> {
        fs::rename(&self.path, target).map_err(|source| RewriteError::Rename {
            from: self.path.clone(),
            to: target.to_path_buf(),
            source,
        })?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Rewrites `path` line by line, returning how many lines were changed
///
/// `rewriter` receives the 1-indexed line number and the line without its
/// terminator. Kept lines are copied byte for byte.
pub fn rewrite_lines<F>(path: &Path, mut rewriter: F) -> Result<usize, RewriteError>
where
    F: FnMut(usize, &str) -> LineEdit,
{
    let original = File::open(path).map_err(|source| RewriteError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    original.lock_exclusive().map_err(|source| RewriteError::Lock {
        path: path.to_path_buf(),
        source,
    })?;

    let permissions = original
        .metadata()
        .map_err(|source| RewriteError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .permissions();

    let temp = TempFile::beside(path);
    let changed = {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp.path)
            .map_err(|source| RewriteError::Create {
                path: temp.path.clone(),
                source,
            })?;

        let write_err = |source: io::Error| RewriteError::Write {
            path: temp.path.clone(),
            source,
        };

        let mut reader = BufReader::new(&original);
        let mut writer = BufWriter::new(file);
        let mut buf = Vec::new();
        let mut number = 0;
        let mut changed = 0;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| RewriteError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
            if read == 0 {
                break;
            }
            number += 1;

            let (content, terminator) = split_terminator(&buf);
            match rewriter(number, &String::from_utf8_lossy(content)) {
                LineEdit::Keep => writer.write_all(&buf).map_err(write_err)?,
                LineEdit::Replace(line) => {
                    writer.write_all(line.as_bytes()).map_err(write_err)?;
                    writer.write_all(terminator).map_err(write_err)?;
                    changed += 1;
                }
                LineEdit::Delete => changed += 1,
            }
        }

        writer.flush().map_err(write_err)?;
        changed
    };

    fs::set_permissions(&temp.path, permissions).map_err(|source| RewriteError::Permissions {
        path: temp.path.clone(),
        source,
    })?;

    // Release the lock before the original is replaced.
    drop(original);
    temp.persist(path)?;

    log::debug!("Rewrote {} ({} lines changed)", path.display(), changed);
    Ok(changed)
}

fn split_terminator(raw: &[u8]) -> (&[u8], &[u8]) {
    let content = raw.strip_suffix(b"\n").unwrap_or(raw);
    let content = content.strip_suffix(b"\r").unwrap_or(content);
    raw.split_at(content.len())
}

/// Rewrites the header line of `todo` with its current serialized form
pub fn update(todo: &Todo) -> Result<(), RewriteError> {
    let header = todo.to_string();
    let changed = rewrite_lines(&todo.filename, |number, _| {
        if number == todo.line {
            LineEdit::Replace(header.clone())
        } else {
            LineEdit::Keep
        }
    })?;

    if changed == 0 {
        return Err(RewriteError::MissingLine {
            path: todo.filename.clone(),
            line: todo.line,
        });
    }
    Ok(())
}

/// Deletes the header line of `todo` and all of its body lines
pub fn remove(todo: &Todo) -> Result<(), RewriteError> {
    let range = todo.line..=todo.last_line();
    let changed = rewrite_lines(&todo.filename, |number, _| {
        if range.contains(&number) {
            LineEdit::Delete
        } else {
            LineEdit::Keep
        }
    })?;

    if changed == 0 {
        return Err(RewriteError::MissingLine {
            path: todo.filename.clone(),
            line: todo.line,
        });
    }
    Ok(())
}
