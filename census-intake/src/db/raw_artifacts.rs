//! Raw artifact persistence
//!
//! Insert and read only. The table's triggers reject UPDATE and DELETE.

use census_common::{time, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{format_timestamp, parse_guid};
use crate::models::RawArtifact;

/// Insert a raw artifact verbatim
pub async fn save_raw_artifact(pool: &SqlitePool, artifact: &RawArtifact) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO raw_artifacts (guid, filename, source_label, submitter_id, file_format, bytes, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(artifact.id.to_string())
    .bind(&artifact.filename)
    .bind(&artifact.source_label)
    .bind(&artifact.submitter_id)
    .bind(&artifact.file_format)
    .bind(&artifact.bytes)
    .bind(format_timestamp(&artifact.created_at))
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a raw artifact by id
pub async fn load_raw_artifact(pool: &SqlitePool, id: Uuid) -> Result<Option<RawArtifact>> {
    let row = sqlx::query(
        r#"
        SELECT guid, filename, source_label, submitter_id, file_format, bytes, created_at
        FROM raw_artifacts
        WHERE guid = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid: String = row.get("guid");
            let created_at: String = row.get("created_at");

            Ok(Some(RawArtifact {
                id: parse_guid(&guid)?,
                filename: row.get("filename"),
                source_label: row.get("source_label"),
                submitter_id: row.get("submitter_id"),
                file_format: row.get("file_format"),
                bytes: row.get("bytes"),
                created_at: time::parse_rfc3339(&created_at)?,
            }))
        }
        None => Ok(None),
    }
}

/// Count raw artifacts
pub async fn count_raw_artifacts(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM raw_artifacts")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
