//! Concurrent directory walker
//!
//! A dispatcher thread feeds tracked paths into a bounded queue drained by a
//! fixed pool of scanner workers. Workers push annotations (and per-file
//! errors) into a bounded results channel that the caller consumes through
//! [`Walk`], an iterator. The stream ends once the dispatcher has run out of
//! paths, or was cancelled, and every worker has finished its current file.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread;

use thiserror::Error;

use super::git::{self, GitError};
use super::{scan_file, ScanError, ScanResult};
use crate::domain::Classifier;

/// Capacity of the results channel; workers block when the consumer lags
const RESULT_BUFFER: usize = 64;

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("Failed to list tracked files in {}: {source}", root.display())]
    Enumerate {
        root: PathBuf,
        #[source]
        source: GitError,
    },
}

/// Stops a walk from dispatching further files
///
/// Files already handed to a worker are still scanned to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Unordered stream of scan results
///
/// Dropping a walk cancels it; workers notice the closed channel and exit.
pub struct Walk {
    results: Receiver<ScanResult>,
    cancel: CancelHandle,
}

impl Walk {
    /// Returns a handle that can cancel this walk from elsewhere
    pub fn canceller(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Iterator for Walk {
    type Item = ScanResult;

    fn next(&mut self) -> Option<Self::Item> {
        self.results.recv().ok()
    }
}

impl Drop for Walk {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Number of workers used by [`walk`]: one per logical CPU
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Walks every git-tracked file under `root`
///
/// Fails before any scanning starts when the files cannot be listed, e.g.
/// when `root` is not inside a repository.
pub fn walk(root: &Path, classifier: Arc<Classifier>) -> Result<Walk, WalkError> {
    let paths = git::ls_files(root).map_err(|source| WalkError::Enumerate {
        root: root.to_path_buf(),
        source,
    })?;

    let workers = default_workers();
    log::info!(
        "Scanning {} tracked files in {} with {} workers",
        paths.len(),
        root.display(),
        workers
    );

    Ok(walk_paths(paths, classifier, workers))
}

/// Scans an explicit list of paths with `workers` threads
pub fn walk_paths(paths: Vec<PathBuf>, classifier: Arc<Classifier>, workers: usize) -> Walk {
    let workers = workers.max(1);
    let cancel = CancelHandle::default();

    let (work_tx, work_rx) = mpsc::sync_channel::<PathBuf>(workers);
    let work_rx = Arc::new(Mutex::new(work_rx));
    let (result_tx, result_rx) = mpsc::sync_channel::<ScanResult>(RESULT_BUFFER);

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let work_rx = Arc::clone(&work_rx);
            let result_tx = result_tx.clone();
            let classifier = Arc::clone(&classifier);
            thread::spawn(move || worker(&work_rx, &result_tx, &classifier))
        })
        .collect();
    drop(result_tx);

    let dispatch = cancel.clone();
    thread::spawn(move || {
        for path in paths {
            if dispatch.is_cancelled() {
                log::debug!("Walk cancelled, stopping dispatch");
                break;
            }
            if work_tx.send(path).is_err() {
                break;
            }
        }
        drop(work_tx);

        for handle in handles {
            if handle.join().is_err() {
                log::error!("Scanner worker panicked");
            }
        }
    });

    Walk {
        results: result_rx,
        cancel,
    }
}

fn worker(work: &Mutex<Receiver<PathBuf>>, results: &SyncSender<ScanResult>, classifier: &Classifier) {
    loop {
        let path = {
            let Ok(queue) = work.lock() else {
                return;
            };
            match queue.recv() {
                Ok(path) => path,
                Err(_) => return,
            }
        };

        if !scan_path(&path, results, classifier) {
            return;
        }
    }
}

/// Scans one path; returns false once nobody consumes results anymore
fn scan_path(path: &Path, results: &SyncSender<ScanResult>, classifier: &Classifier) -> bool {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(source) => {
            let err = ScanError::Stat {
                path: path.to_path_buf(),
                source,
            };
            return results.send(Err(err)).is_ok();
        }
    };

    if metadata.is_dir() {
        log::warn!(
            "`{}` is probably a submodule. Skipping it for now...",
            path.display()
        );
        return true;
    }

    log::debug!("Scanning {}", path.display());
    let outcome = scan_file(path, classifier, |todo| {
        results.send(Ok(todo)).map_err(|_| ScanError::Stopped {
            path: path.to_path_buf(),
        })
    });

    match outcome {
        Ok(()) => true,
        Err(ScanError::Stopped { .. }) => false,
        Err(err) => results.send(Err(err)).is_ok(),
    }
}
