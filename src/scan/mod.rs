//! # Scanning
//!
//! Finds annotations in files and across a git working tree.
//!
//! ## Pipeline
//!
//! ```text
//! git ls-files ──> dispatcher ──(bounded queue)──> N workers ──> results
//!                      ^                              │
//!                 CancelHandle                  scan_file + Classifier
//! ```
//!
//! - [`scan_file`] runs the per-file state machine
//! - [`walk`] fans files out to one worker per logical CPU and streams
//!   [`ScanResult`]s back in no particular order
//! - [`git`] wraps the `git` commands the rest of the crate needs

pub mod git;
mod scanner;
mod walker;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::Todo;

pub use scanner::{scan_file, scan_reader};
pub use walker::{default_workers, walk, walk_paths, CancelHandle, Walk, WalkError};

/// Per-file scan failure, always tagged with the file it came from
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to stat {}: {source}", path.display())]
    Stat {
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

    #[error("Scan of {} stopped: results are no longer consumed", path.display())]
    Stopped { path: PathBuf },
}

impl ScanError {
    /// The file the error originated from
    pub fn path(&self) -> &Path {
        match self {
            ScanError::Stat { path, .. }
            | ScanError::Read { path, .. }
            | ScanError::Stopped { path } => path,
        }
    }
}

/// One item of a walk: an annotation or a per-file error
pub type ScanResult = Result<Todo, ScanError>;
