//! Cleaned artifact endpoints
//!
//! Listing, download, preview and workflow status updates. Every download
//! and preview is recorded in the access log under the `x-actor-id` header.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ACTOR_HEADER;
use crate::models::{AccessAction, CleanedArtifact, CleanedArtifactSummary, WorkflowStatus, XLSX_MIME};
use crate::pipeline::decode_xlsx;
use crate::{ApiError, ApiResult, AppState};

/// Rows returned by the preview endpoint
pub const PREVIEW_ROWS: usize = 10;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub submitter_id: Option<String>,
}

/// Preview response
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub id: Uuid,
    pub filename: String,
    pub row_count: usize,
    pub headers: Vec<String>,
    /// At most `PREVIEW_ROWS` rows
    pub rows: Vec<Vec<String>>,
}

/// Status update request; `status` is the stored value ("0", "1", "2")
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// GET /artifacts
pub async fn list_artifacts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<CleanedArtifactSummary>>> {
    let submitter = query
        .submitter_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let artifacts = state.store.list_cleaned(submitter).await?;
    Ok(Json(artifacts))
}

/// GET /artifacts/:id/download
pub async fn download_artifact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let actor_id = actor_id(&headers)?;
    let artifact = load_artifact(&state, &id).await?;

    state
        .store
        .record_access(&actor_id, &artifact.filename, AccessAction::Download)
        .await?;
    tracing::info!(actor_id = %actor_id, filename = %artifact.filename, "Cleaned artifact downloaded");

    let disposition = format!(
        "attachment; filename=\"{}\"",
        artifact.filename.replace('"', "")
    );

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    ))
}

/// GET /artifacts/:id/preview
pub async fn preview_artifact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<PreviewResponse>> {
    let actor_id = actor_id(&headers)?;
    let artifact = load_artifact(&state, &id).await?;

    let table = decode_xlsx(&artifact.bytes)
        .map_err(|e| ApiError::Internal(format!("Stored artifact unreadable: {}", e)))?;

    state
        .store
        .record_access(&actor_id, &artifact.filename, AccessAction::Preview)
        .await?;

    Ok(Json(PreviewResponse {
        id: artifact.id,
        filename: artifact.filename,
        row_count: artifact.row_count,
        headers: table.headers,
        rows: table.rows.into_iter().take(PREVIEW_ROWS).collect(),
    }))
}

/// POST /artifacts/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> ApiResult<Json<CleanedArtifactSummary>> {
    let id = parse_id(&id)?;
    let status = WorkflowStatus::from_stored(&request.status)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state.store.update_status(id, status).await?;

    let artifact = state
        .store
        .load_cleaned(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Artifact {}", id)))?;

    Ok(Json(artifact.summary()))
}

fn actor_id(headers: &HeaderMap) -> ApiResult<String> {
    headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest(format!("missing {} header", ACTOR_HEADER)))
}

fn parse_id(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| ApiError::BadRequest(format!("Invalid artifact id: {}", id)))
}

async fn load_artifact(state: &AppState, id: &str) -> ApiResult<CleanedArtifact> {
    let id = parse_id(id)?;
    state
        .store
        .load_cleaned(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Artifact {}", id)))
}

/// Build artifact routes
pub fn artifact_routes() -> Router<AppState> {
    Router::new()
        .route("/artifacts", get(list_artifacts))
        .route("/artifacts/:id/download", get(download_artifact))
        .route("/artifacts/:id/preview", get(preview_artifact))
        .route("/artifacts/:id/status", post(update_status))
}
