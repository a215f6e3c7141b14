//! Interactive upload endpoint
//!
//! POST /upload (multipart/form-data)
//! - `file`: the census spreadsheet
//! - `source_label`: union or organization the batch belongs to
//! - `submitter_id`: authenticated uploader

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use census_common::events::IntakeChannel;
use serde::Serialize;
use uuid::Uuid;

use crate::models::WorkflowStatus;
use crate::pipeline::{IngestRequest, SpreadsheetFormat};
use crate::{ApiError, ApiResult, AppState};

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub raw_artifact_id: Uuid,
    pub cleaned_artifact_id: Uuid,
    /// Cleaned artifact filename (`.xlsx`)
    pub filename: String,
    pub row_count: usize,
    pub workflow_status: WorkflowStatus,
    pub dropped_without_identity: usize,
    pub duplicates_removed: usize,
}

#[derive(Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    source_label: Option<String>,
    submitter_id: Option<String>,
}

/// POST /upload
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::BadRequest("file field has no filename".to_string()))?;

                // Reject before reading the body into the pipeline
                SpreadsheetFormat::detect(&filename)?;

                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Cannot read file: {}", e)))?;
                form.file = Some((filename, bytes.to_vec()));
            }
            "source_label" | "submitter_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Cannot read {}: {}", name, e)))?;
                if name == "source_label" {
                    form.source_label = Some(value);
                } else {
                    form.submitter_id = Some(value);
                }
            }
            other => tracing::debug!(field = %other, "Ignoring unknown upload field"),
        }
    }

    let (filename, bytes) = form
        .file
        .ok_or_else(|| ApiError::BadRequest("missing file field".to_string()))?;
    let source_label = required(form.source_label, "source_label")?;
    let submitter_id = required(form.submitter_id, "submitter_id")?;

    let outcome = state
        .pipeline
        .ingest(IngestRequest {
            filename,
            source_label,
            submitter_id,
            bytes,
            channel: IntakeChannel::Upload,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            raw_artifact_id: outcome.raw.id,
            cleaned_artifact_id: outcome.cleaned.id,
            filename: outcome.cleaned.filename,
            row_count: outcome.cleaned.row_count,
            workflow_status: outcome.cleaned.workflow_status,
            dropped_without_identity: outcome.dropped_without_identity,
            duplicates_removed: outcome.duplicates_removed,
        }),
    ))
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!("missing {} field", field))),
    }
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new().route("/upload", post(upload))
}
