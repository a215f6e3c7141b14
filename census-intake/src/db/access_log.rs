//! Append-only access log

use census_common::{time, Error, Result};
use sqlx::{Row, SqlitePool};

use super::format_timestamp;
use crate::models::{AccessAction, AccessLogEntry};

pub async fn append_access(pool: &SqlitePool, entry: &AccessLogEntry) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO access_log (actor_id, artifact_filename, action, timestamp)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&entry.actor_id)
    .bind(&entry.artifact_filename)
    .bind(entry.action.as_str())
    .bind(format_timestamp(&entry.timestamp))
    .execute(pool)
    .await?;

    Ok(())
}

/// Access entries for one artifact filename, oldest first
pub async fn load_access_log(pool: &SqlitePool, artifact_filename: &str) -> Result<Vec<AccessLogEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT actor_id, artifact_filename, action, timestamp
        FROM access_log
        WHERE artifact_filename = ?
        ORDER BY id ASC
        "#,
    )
    .bind(artifact_filename)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let action: String = row.get("action");
            let timestamp: String = row.get("timestamp");
            Ok(AccessLogEntry {
                actor_id: row.get("actor_id"),
                artifact_filename: row.get("artifact_filename"),
                action: AccessAction::parse(&action)
                    .ok_or_else(|| Error::Internal(format!("Unknown access action '{}'", action)))?,
                timestamp: time::parse_rfc3339(&timestamp)?,
            })
        })
        .collect()
}
