//! Cleaned artifact persistence

use census_common::{time, Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{format_timestamp, parse_guid};
use crate::models::{CleanedArtifact, CleanedArtifactSummary, WorkflowStatus};

/// Insert a cleaned artifact
pub async fn save_cleaned_artifact(pool: &SqlitePool, artifact: &CleanedArtifact) -> Result<()> {
    let row_count = i64::try_from(artifact.row_count)
        .map_err(|_| Error::InvalidInput(format!("row count {} out of range", artifact.row_count)))?;

    sqlx::query(
        r#"
        INSERT INTO cleaned_artifacts (
            guid, raw_guid, filename, source_label, submitter_id, file_format,
            bytes, row_count, workflow_status, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(artifact.id.to_string())
    .bind(artifact.raw_artifact_id.to_string())
    .bind(&artifact.filename)
    .bind(&artifact.source_label)
    .bind(&artifact.submitter_id)
    .bind(&artifact.file_format)
    .bind(&artifact.bytes)
    .bind(row_count)
    .bind(artifact.workflow_status.as_stored())
    .bind(format_timestamp(&artifact.created_at))
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a cleaned artifact, payload included
pub async fn load_cleaned_artifact(pool: &SqlitePool, id: Uuid) -> Result<Option<CleanedArtifact>> {
    let row = sqlx::query(
        r#"
        SELECT guid, raw_guid, filename, source_label, submitter_id, file_format,
               bytes, row_count, workflow_status, created_at
        FROM cleaned_artifacts
        WHERE guid = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let summary = summary_from_row(&row)?;
            Ok(Some(CleanedArtifact {
                id: summary.id,
                raw_artifact_id: summary.raw_artifact_id,
                filename: summary.filename,
                source_label: summary.source_label,
                submitter_id: summary.submitter_id,
                file_format: summary.file_format,
                bytes: row.get("bytes"),
                row_count: summary.row_count,
                workflow_status: summary.workflow_status,
                created_at: summary.created_at,
            }))
        }
        None => Ok(None),
    }
}

/// List cleaned artifact metadata, newest first
///
/// `submitter_id` restricts the listing to one submitter.
pub async fn list_cleaned_artifacts(
    pool: &SqlitePool,
    submitter_id: Option<&str>,
) -> Result<Vec<CleanedArtifactSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, raw_guid, filename, source_label, submitter_id, file_format,
               row_count, workflow_status, created_at
        FROM cleaned_artifacts
        WHERE (?1 IS NULL OR submitter_id = ?1)
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(submitter_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(summary_from_row).collect()
}

/// Current workflow status of a cleaned artifact
pub async fn load_workflow_status(pool: &SqlitePool, id: Uuid) -> Result<Option<WorkflowStatus>> {
    let stored: Option<String> =
        sqlx::query_scalar("SELECT workflow_status FROM cleaned_artifacts WHERE guid = ?")
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?;

    stored.map(|value| parse_status(&value)).transpose()
}

/// Set the workflow status; returns false when no artifact has `id`
pub async fn update_workflow_status(
    pool: &SqlitePool,
    id: Uuid,
    status: WorkflowStatus,
) -> Result<bool> {
    let result = sqlx::query("UPDATE cleaned_artifacts SET workflow_status = ? WHERE guid = ?")
        .bind(status.as_stored())
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Count cleaned artifacts
pub async fn count_cleaned_artifacts(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cleaned_artifacts")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn parse_status(value: &str) -> Result<WorkflowStatus> {
    WorkflowStatus::from_stored(value).map_err(|e| Error::Internal(e.to_string()))
}

fn summary_from_row(row: &SqliteRow) -> Result<CleanedArtifactSummary> {
    let guid: String = row.get("guid");
    let raw_guid: String = row.get("raw_guid");
    let row_count: i64 = row.get("row_count");
    let status: String = row.get("workflow_status");
    let created_at: String = row.get("created_at");

    Ok(CleanedArtifactSummary {
        id: parse_guid(&guid)?,
        raw_artifact_id: parse_guid(&raw_guid)?,
        filename: row.get("filename"),
        source_label: row.get("source_label"),
        submitter_id: row.get("submitter_id"),
        file_format: row.get("file_format"),
        row_count: usize::try_from(row_count)
            .map_err(|_| Error::Internal(format!("negative row count {}", row_count)))?,
        workflow_status: parse_status(&status)?,
        created_at: time::parse_rfc3339(&created_at)?,
    })
}
