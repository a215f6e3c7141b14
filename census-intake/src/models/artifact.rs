//! Persisted artifact records
//!
//! Two tiers per ingested file: the raw artifact (verbatim submitted bytes)
//! and the cleaned artifact (normalized table re-encoded as xlsx).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WorkflowStatus;

/// Extension carried by every cleaned artifact
pub const CLEANED_EXTENSION: &str = "xlsx";

/// MIME type of cleaned artifacts
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Verbatim copy of a submitted file. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArtifact {
    pub id: Uuid,
    pub filename: String,
    pub source_label: String,
    pub submitter_id: String,
    /// Lower-cased extension of the submitted file ("csv", "txt", "xls", "xlsx")
    pub file_format: String,
    pub bytes: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl RawArtifact {
    /// Create a new raw artifact stamped with the current time
    pub fn new(
        filename: String,
        source_label: String,
        submitter_id: String,
        file_format: String,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            source_label,
            submitter_id,
            file_format,
            bytes,
            created_at: Utc::now(),
        }
    }
}

/// Normalized, deduplicated census table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedArtifact {
    pub id: Uuid,
    /// Raw artifact written by the same pipeline invocation
    pub raw_artifact_id: Uuid,
    pub filename: String,
    pub source_label: String,
    pub submitter_id: String,
    pub file_format: String,
    pub bytes: Vec<u8>,
    /// Data rows encoded in `bytes` (header excluded)
    pub row_count: usize,
    pub workflow_status: WorkflowStatus,
    pub created_at: DateTime<Utc>,
}

impl CleanedArtifact {
    /// Create a new cleaned artifact in the pending state
    ///
    /// `original_filename` is re-suffixed to `.xlsx`.
    pub fn new(
        raw: &RawArtifact,
        original_filename: &str,
        bytes: Vec<u8>,
        row_count: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            raw_artifact_id: raw.id,
            filename: cleaned_filename(original_filename),
            source_label: raw.source_label.clone(),
            submitter_id: raw.submitter_id.clone(),
            file_format: CLEANED_EXTENSION.to_string(),
            bytes,
            row_count,
            workflow_status: WorkflowStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Metadata view without the payload
    pub fn summary(&self) -> CleanedArtifactSummary {
        CleanedArtifactSummary {
            id: self.id,
            raw_artifact_id: self.raw_artifact_id,
            filename: self.filename.clone(),
            source_label: self.source_label.clone(),
            submitter_id: self.submitter_id.clone(),
            file_format: self.file_format.clone(),
            row_count: self.row_count,
            workflow_status: self.workflow_status,
            created_at: self.created_at,
        }
    }
}

/// Cleaned artifact metadata for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedArtifactSummary {
    pub id: Uuid,
    pub raw_artifact_id: Uuid,
    pub filename: String,
    pub source_label: String,
    pub submitter_id: String,
    pub file_format: String,
    pub row_count: usize,
    pub workflow_status: WorkflowStatus,
    pub created_at: DateTime<Utc>,
}

/// How a downstream consumer read a cleaned artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessAction {
    Download,
    Preview,
}

impl AccessAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessAction::Download => "download",
            AccessAction::Preview => "preview",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "download" => Some(AccessAction::Download),
            "preview" => Some(AccessAction::Preview),
            _ => None,
        }
    }
}

/// Append-only access record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLogEntry {
    pub actor_id: String,
    pub artifact_filename: String,
    pub action: AccessAction,
    pub timestamp: DateTime<Utc>,
}

/// Replace the extension of `filename` with `.xlsx`
///
/// Only the last extension is replaced; a name without one gains it.
pub fn cleaned_filename(filename: &str) -> String {
    let stem = match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    };
    format!("{}.{}", stem, CLEANED_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleaned_filename_replaces_last_extension() {
        assert_eq!(cleaned_filename("members.csv"), "members.xlsx");
        assert_eq!(cleaned_filename("members.XLS"), "members.xlsx");
        assert_eq!(cleaned_filename("members.2024.txt"), "members.2024.xlsx");
        assert_eq!(cleaned_filename("members.xlsx"), "members.xlsx");
    }

    #[test]
    fn test_cleaned_filename_without_extension() {
        assert_eq!(cleaned_filename("members"), "members.xlsx");
        assert_eq!(cleaned_filename(".csv"), ".csv.xlsx");
    }

    #[test]
    fn test_cleaned_artifact_inherits_raw_metadata() {
        let raw = RawArtifact::new(
            "roster.csv".to_string(),
            "AcmeLocal12".to_string(),
            "sftp".to_string(),
            "csv".to_string(),
            b"first,last\n".to_vec(),
        );

        let cleaned = CleanedArtifact::new(&raw, &raw.filename, vec![1, 2, 3], 7);

        assert_eq!(cleaned.raw_artifact_id, raw.id);
        assert_eq!(cleaned.filename, "roster.xlsx");
        assert_eq!(cleaned.source_label, "AcmeLocal12");
        assert_eq!(cleaned.submitter_id, "sftp");
        assert_eq!(cleaned.file_format, "xlsx");
        assert_eq!(cleaned.row_count, 7);
        assert_eq!(cleaned.workflow_status, WorkflowStatus::Pending);
        assert_eq!(cleaned.summary().row_count, 7);
    }

    #[test]
    fn test_access_action_strings() {
        for action in [AccessAction::Download, AccessAction::Preview] {
            assert_eq!(AccessAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(AccessAction::parse("delete"), None);
    }
}
