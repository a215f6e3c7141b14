//! Directory watcher
//!
//! Automated intake for files deposited under the watch root (typically an
//! SFTP drop tree laid out as `<group>/<source label>/<file>`).
//!
//! Two tasks joined by a bounded queue:
//! - the detector polls a [`DirectoryChangeSource`] and queues eligible files
//! - the worker runs queued files through the pipeline one at a time
//!
//! Both stop when the cancellation token fires.

pub mod source;
pub mod worker;

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::pipeline::{is_accepted_extension, IngestPipeline};

pub use source::{check_watch_root, DetectedFile, DirectoryChangeSource, PollingSource, WatchError};
pub use worker::{ingest_detected, run_worker};

/// Submitter recorded for watcher intake
pub const AUTOMATED_INTAKE_SUBMITTER: &str = "sftp";

/// Watcher settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    pub watch_root: PathBuf,
    pub poll_interval: Duration,
    pub queue_capacity: usize,
    /// Ingest files already present at startup
    pub process_existing: bool,
}

impl WatcherConfig {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
    pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

    pub fn new(watch_root: impl Into<PathBuf>) -> Self {
        Self {
            watch_root: watch_root.into(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
            process_existing: false,
        }
    }
}

/// Running watcher tasks
pub struct WatcherHandle {
    detector: JoinHandle<()>,
    worker: JoinHandle<()>,
}

impl WatcherHandle {
    /// Wait for both tasks to finish (after cancellation)
    pub async fn join(self) {
        if let Err(e) = self.detector.await {
            warn!("Watcher detector task ended abnormally: {}", e);
        }
        if let Err(e) = self.worker.await {
            warn!("Watcher worker task ended abnormally: {}", e);
        }
    }
}

/// True for files the watcher should ingest
///
/// Skips dot-prefixed names (`.staging.csv` upload temp files) and
/// extensions outside the accepted spreadsheet set.
pub fn is_eligible(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|name| name.to_string_lossy()) else {
        return false;
    };
    !name.starts_with('.') && is_accepted_extension(&name)
}

/// Source label of a watched file: its immediate parent directory name
pub fn source_label_for(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Start polling `config.watch_root`
pub fn spawn_watcher(
    config: WatcherConfig,
    pipeline: IngestPipeline,
    cancel: CancellationToken,
) -> Result<WatcherHandle, WatchError> {
    check_watch_root(&config.watch_root)?;
    let source = PollingSource::new(config.watch_root.clone(), config.process_existing);
    Ok(spawn_with_source(source, &config, pipeline, cancel))
}

/// Start the watcher tasks over any change source
pub fn spawn_with_source<S>(
    source: S,
    config: &WatcherConfig,
    pipeline: IngestPipeline,
    cancel: CancellationToken,
) -> WatcherHandle
where
    S: DirectoryChangeSource + 'static,
{
    let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));

    info!(
        watch_root = %config.watch_root.display(),
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        queue_capacity = config.queue_capacity,
        "Directory watcher started"
    );

    let detector = tokio::spawn(run_detector(source, tx, config.poll_interval, cancel.clone()));
    let worker = tokio::spawn(run_worker(rx, pipeline, cancel));

    WatcherHandle { detector, worker }
}

/// Poll `source` every `interval` and queue eligible files
pub async fn run_detector<S>(
    mut source: S,
    tx: mpsc::Sender<DetectedFile>,
    interval: Duration,
    cancel: CancellationToken,
) where
    S: DirectoryChangeSource,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    'outer: loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let files = match source.poll().await {
            Ok(files) => files,
            Err(e) => {
                warn!(error = %e, "Watch poll failed");
                continue;
            }
        };

        for file in files {
            if !is_eligible(&file.path) {
                debug!(path = %file.path.display(), "Ignoring ineligible file");
                continue;
            }

            debug!(path = %file.path.display(), size = file.size, "Queueing detected file");
            tokio::select! {
                _ = cancel.cancelled() => break 'outer,
                sent = tx.send(file) => {
                    if sent.is_err() {
                        break 'outer;
                    }
                }
            }
        }
    }

    info!("Watcher detector stopped");
}
