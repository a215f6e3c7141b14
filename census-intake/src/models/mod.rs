//! Data models for census intake

pub mod artifact;
pub mod canonical;
pub mod workflow_status;

pub use artifact::{
    cleaned_filename, AccessAction, AccessLogEntry, CleanedArtifact, CleanedArtifactSummary,
    RawArtifact, CLEANED_EXTENSION, XLSX_MIME,
};
pub use canonical::{canonical_headers, CanonicalField, CanonicalRecord, FIELD_COUNT};
pub use workflow_status::{StatusError, WorkflowStatus};
