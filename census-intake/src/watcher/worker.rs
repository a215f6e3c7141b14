//! Watcher worker: runs queued files through the pipeline one at a time

use census_common::events::IntakeChannel;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::source::{DetectedFile, WatchError};
use super::{source_label_for, AUTOMATED_INTAKE_SUBMITTER};
use crate::pipeline::{IngestOutcome, IngestPipeline, IngestRequest};

/// Drain the queue until it closes or `cancel` fires
///
/// A failed file is logged and skipped.
pub async fn run_worker(
    mut rx: mpsc::Receiver<DetectedFile>,
    pipeline: IngestPipeline,
    cancel: CancellationToken,
) {
    loop {
        let file = tokio::select! {
            _ = cancel.cancelled() => break,
            file = rx.recv() => match file {
                Some(file) => file,
                None => break,
            },
        };

        if let Err(e) = ingest_detected(&pipeline, &file).await {
            warn!(path = %file.path.display(), error = %e, "Watched file not ingested");
        }
    }

    info!("Watcher worker stopped");
}

/// Read a detected file and ingest it as an automated submission
pub async fn ingest_detected(
    pipeline: &IngestPipeline,
    file: &DetectedFile,
) -> Result<IngestOutcome, WatchError> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|source| WatchError::Read {
            path: file.path.clone(),
            source,
        })?;

    let filename = file
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let outcome = pipeline
        .ingest(IngestRequest {
            filename,
            source_label: source_label_for(&file.path),
            submitter_id: AUTOMATED_INTAKE_SUBMITTER.to_string(),
            bytes,
            channel: IntakeChannel::Watcher,
        })
        .await?;

    Ok(outcome)
}
