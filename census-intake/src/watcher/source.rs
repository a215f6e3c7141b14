//! Directory change sources
//!
//! A change source reports files that newly appeared under the watch root.
//! [`PollingSource`] diffs recursive directory snapshots; other sources
//! (filesystem notifications, object-store listings) plug in through
//! [`DirectoryChangeSource`].

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use walkdir::WalkDir;

use crate::pipeline::PipelineError;

/// Watcher errors
#[derive(Debug, Error)]
pub enum WatchError {
    /// Watch root does not exist
    #[error("Watch root not found: {0}")]
    RootNotFound(PathBuf),

    /// Watch root exists but is not a directory
    #[error("Watch root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Directory snapshot could not be taken
    #[error("Scan failed: {0}")]
    Scan(String),

    /// Detected file could not be read
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Pipeline rejected the file
    #[error(transparent)]
    Ingest(#[from] PipelineError),
}

/// A file that appeared under the watch root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedFile {
    pub path: PathBuf,
    /// Size in bytes at detection time
    pub size: u64,
}

/// Source of newly created files
#[async_trait]
pub trait DirectoryChangeSource: Send {
    /// Files that appeared since the previous poll
    async fn poll(&mut self) -> Result<Vec<DetectedFile>, WatchError>;
}

/// Check that `root` is an existing directory
pub fn check_watch_root(root: &Path) -> Result<(), WatchError> {
    if !root.exists() {
        return Err(WatchError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(WatchError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Snapshot-diffing change source
///
/// The first poll records a baseline and reports nothing, unless
/// `process_existing` is set. A new file is reported once its size is the
/// same on two consecutive polls, so partially uploaded files are held back.
/// Each path is reported once; a path that disappears and comes back is
/// reported again. A scan that could not read every entry leaves the state
/// untouched, so files under a briefly unreadable directory are not
/// forgotten and re-reported.
pub struct PollingSource {
    root: PathBuf,
    process_existing: bool,
    initialized: bool,
    /// Reported (or baseline) paths
    seen: HashSet<PathBuf>,
    /// New paths waiting for a stable size
    pending: HashMap<PathBuf, u64>,
}

impl PollingSource {
    pub fn new(root: impl Into<PathBuf>, process_existing: bool) -> Self {
        Self {
            root: root.into(),
            process_existing,
            initialized: false,
            seen: HashSet::new(),
            pending: HashMap::new(),
        }
    }

    /// Apply one scan result; failed scans change nothing
    fn apply_scan(
        &mut self,
        scan: Result<HashMap<PathBuf, u64>, WatchError>,
    ) -> Result<Vec<DetectedFile>, WatchError> {
        scan.map(|snapshot| self.observe(snapshot))
    }

    /// Diff a complete snapshot against the previous state
    fn observe(&mut self, snapshot: HashMap<PathBuf, u64>) -> Vec<DetectedFile> {
        self.seen.retain(|path| snapshot.contains_key(path));
        self.pending.retain(|path, _| snapshot.contains_key(path));

        if !self.initialized {
            self.initialized = true;
            if !self.process_existing {
                tracing::debug!(files = snapshot.len(), "Watch baseline recorded");
                self.seen.extend(snapshot.into_keys());
                return Vec::new();
            }
        }

        let mut ready = Vec::new();
        for (path, size) in snapshot {
            if self.seen.contains(&path) {
                continue;
            }
            match self.pending.get(&path) {
                Some(previous) if *previous == size => {
                    self.pending.remove(&path);
                    self.seen.insert(path.clone());
                    ready.push(DetectedFile { path, size });
                }
                _ => {
                    self.pending.insert(path, size);
                }
            }
        }

        ready.sort_by(|a, b| a.path.cmp(&b.path));
        ready
    }
}

#[async_trait]
impl DirectoryChangeSource for PollingSource {
    async fn poll(&mut self) -> Result<Vec<DetectedFile>, WatchError> {
        let root = self.root.clone();
        let scan = tokio::task::spawn_blocking(move || snapshot_files(&root))
            .await
            .map_err(|e| WatchError::Scan(format!("snapshot task failed: {}", e)))?;

        self.apply_scan(scan)
    }
}

/// Every regular file under `root` with its size
///
/// Entries removed while the walk runs are skipped. Any other access error
/// fails the whole snapshot.
fn snapshot_files(root: &Path) -> Result<HashMap<PathBuf, u64>, WatchError> {
    check_watch_root(root)?;

    let mut files = HashMap::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if vanished(&e) => continue,
            Err(e) => {
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                return Err(WatchError::Scan(format!("cannot access {}: {}", path, e)));
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.metadata() {
            Ok(metadata) => {
                files.insert(entry.into_path(), metadata.len());
            }
            Err(e) if vanished(&e) => continue,
            Err(e) => {
                return Err(WatchError::Scan(format!(
                    "cannot stat {}: {}",
                    entry.path().display(),
                    e
                )));
            }
        }
    }

    Ok(files)
}

fn vanished(error: &walkdir::Error) -> bool {
    error
        .io_error()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}
