//! Pipeline error taxonomy

use thiserror::Error;

/// Which persistence step failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStage {
    /// Writing the verbatim raw artifact
    RawArchive,
    /// Re-encoding the cleaned table as xlsx
    Encode,
    /// Writing the cleaned artifact
    CleanedStore,
}

impl std::fmt::Display for PersistStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PersistStage::RawArchive => "raw archive",
            PersistStage::Encode => "cleaned encode",
            PersistStage::CleanedStore => "cleaned store",
        };
        f.write_str(name)
    }
}

/// Ingest pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Extension outside the accepted spreadsheet set (rejected before parsing)
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Bytes do not parse as the declared format
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Archiver or store write did not complete
    #[error("Persistence failure during {stage}: {message}")]
    PersistenceFailure { stage: PersistStage, message: String },
}

impl PipelineError {
    pub fn persistence(stage: PersistStage, error: impl std::fmt::Display) -> Self {
        PipelineError::PersistenceFailure {
            stage,
            message: error.to_string(),
        }
    }

    /// Short machine-readable kind, used in logs and API error codes
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            PipelineError::MalformedInput(_) => "MALFORMED_INPUT",
            PipelineError::PersistenceFailure { .. } => "PERSISTENCE_FAILURE",
        }
    }
}
