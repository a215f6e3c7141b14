//! Census ingest pipeline
//!
//! One invocation per submitted file, shared by the upload endpoint and the
//! directory watcher:
//!
//! 1. detect the format from the extension
//! 2. parse the bytes (nothing is written if this fails)
//! 3. archive the raw bytes verbatim
//! 4. map headers onto the canonical schema, clean, deduplicate
//! 5. re-encode as xlsx and store the cleaned artifact
//!
//! A failure after step 3 leaves the raw artifact in place without a cleaned
//! counterpart. There is no compensating delete; raw artifacts are
//! immutable.

pub mod cleaner;
pub mod deduplicator;
pub mod encoder;
pub mod error;
pub mod format;
pub mod loader;
pub mod schema_mapper;

use std::sync::Arc;

use census_common::events::{EventBus, IngestEvent, IntakeChannel};
use census_common::time;
use tracing::{info, warn};

use crate::models::{CleanedArtifact, RawArtifact};
use crate::store::ArtifactStore;

pub use cleaner::{clean_records, CleanedBatch};
pub use deduplicator::{dedup, DedupKey};
pub use encoder::{count_xlsx_rows, decode_xlsx, encode_xlsx};
pub use error::{PersistStage, PipelineError};
pub use format::{is_accepted_extension, SpreadsheetFormat, ACCEPTED_EXTENSIONS};
pub use loader::Table;
pub use schema_mapper::map_table;

/// One submitted file
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub filename: String,
    pub source_label: String,
    pub submitter_id: String,
    pub bytes: Vec<u8>,
    pub channel: IntakeChannel,
}

/// Result of a successful invocation
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub raw: RawArtifact,
    pub cleaned: CleanedArtifact,
    /// Rows dropped for lacking a name and an email
    pub dropped_without_identity: usize,
    /// Rows collapsed by the deduplicator
    pub duplicates_removed: usize,
}

/// Ingest pipeline bound to a store
#[derive(Clone)]
pub struct IngestPipeline {
    store: Arc<dyn ArtifactStore>,
    dedup_key: DedupKey,
    event_bus: Option<EventBus>,
}

impl IngestPipeline {
    pub fn new(store: Arc<dyn ArtifactStore>, dedup_key: DedupKey) -> Self {
        Self {
            store,
            dedup_key,
            event_bus: None,
        }
    }

    /// Broadcast an [`IngestEvent`] after every invocation
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Run one file through the pipeline
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestOutcome, PipelineError> {
        let channel = request.channel;
        let filename = request.filename.clone();
        let source_label = request.source_label.clone();

        let result = self.run(request).await;

        match &result {
            Ok(outcome) => {
                info!(
                    channel = ?channel,
                    filename = %filename,
                    source_label = %source_label,
                    cleaned_artifact_id = %outcome.cleaned.id,
                    row_count = outcome.cleaned.row_count,
                    dropped_without_identity = outcome.dropped_without_identity,
                    duplicates_removed = outcome.duplicates_removed,
                    "Census file ingested"
                );
                self.emit(IngestEvent::IngestCompleted {
                    channel,
                    filename,
                    source_label,
                    raw_artifact_id: outcome.raw.id,
                    cleaned_artifact_id: outcome.cleaned.id,
                    row_count: outcome.cleaned.row_count,
                    timestamp: time::now(),
                });
            }
            Err(e) => {
                warn!(
                    channel = ?channel,
                    filename = %filename,
                    source_label = %source_label,
                    kind = e.kind(),
                    error = %e,
                    "Census file rejected"
                );
                self.emit(IngestEvent::IngestFailed {
                    channel,
                    filename,
                    source_label,
                    error: e.to_string(),
                    timestamp: time::now(),
                });
            }
        }

        result
    }

    async fn run(&self, request: IngestRequest) -> Result<IngestOutcome, PipelineError> {
        let (format, extension) = SpreadsheetFormat::detect(&request.filename)?;
        let table = loader::load(&request.bytes, format)?;

        let raw = RawArtifact::new(
            request.filename,
            request.source_label,
            request.submitter_id,
            extension,
            request.bytes,
        );
        self.store
            .archive_raw(&raw)
            .await
            .map_err(|e| PipelineError::persistence(PersistStage::RawArchive, e))?;

        let mapped = map_table(&table);
        let batch = clean_records(mapped);
        let cleaned_count = batch.records.len();
        let records = dedup(batch.records, &self.dedup_key);
        let duplicates_removed = cleaned_count - records.len();

        let bytes = encode_xlsx(&records).map_err(|e| self.orphaned(&raw, PersistStage::Encode, e))?;
        let cleaned = CleanedArtifact::new(&raw, &raw.filename, bytes, records.len());

        self.store
            .store_cleaned(&cleaned)
            .await
            .map_err(|e| self.orphaned(&raw, PersistStage::CleanedStore, e))?;

        Ok(IngestOutcome {
            raw,
            cleaned,
            dropped_without_identity: batch.dropped_without_identity,
            duplicates_removed,
        })
    }

    /// Failure after the raw write: the raw artifact stays without a cleaned twin
    fn orphaned(
        &self,
        raw: &RawArtifact,
        stage: PersistStage,
        error: impl std::fmt::Display,
    ) -> PipelineError {
        warn!(
            raw_artifact_id = %raw.id,
            filename = %raw.filename,
            stage = %stage,
            "Raw artifact left without cleaned artifact"
        );
        PipelineError::persistence(stage, error)
    }

    fn emit(&self, event: IngestEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(event);
        }
    }
}
