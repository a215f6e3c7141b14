//! Database initialization
//!
//! Opens (or creates) the census SQLite database and applies the schema.
//! Every statement is idempotent, so initialization is safe on every start.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_connection(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

/// Initialize an in-memory database (tests and throwaway tooling)
///
/// Limited to one connection: every new connection to `sqlite::memory:`
/// would otherwise see its own empty database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

async fn configure_connection(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL lets the watcher worker and request handlers write alongside readers
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}

/// Create all census tables, indexes and triggers
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_raw_artifacts_table(pool).await?;
    create_cleaned_artifacts_table(pool).await?;
    create_access_log_table(pool).await?;
    Ok(())
}

async fn create_raw_artifacts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS raw_artifacts (
            guid TEXT PRIMARY KEY,
            filename TEXT NOT NULL,
            source_label TEXT NOT NULL,
            submitter_id TEXT NOT NULL,
            file_format TEXT NOT NULL,
            bytes BLOB NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Provenance copies are write-once
    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS raw_artifacts_no_update
        BEFORE UPDATE ON raw_artifacts
        BEGIN
            SELECT RAISE(ABORT, 'raw artifacts are immutable');
        END
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER IF NOT EXISTS raw_artifacts_no_delete
        BEFORE DELETE ON raw_artifacts
        BEGIN
            SELECT RAISE(ABORT, 'raw artifacts are immutable');
        END
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_cleaned_artifacts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cleaned_artifacts (
            guid TEXT PRIMARY KEY,
            raw_guid TEXT NOT NULL REFERENCES raw_artifacts(guid),
            filename TEXT NOT NULL,
            source_label TEXT NOT NULL,
            submitter_id TEXT NOT NULL,
            file_format TEXT NOT NULL,
            bytes BLOB NOT NULL,
            row_count INTEGER NOT NULL CHECK (row_count >= 0),
            workflow_status TEXT NOT NULL DEFAULT '0',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_cleaned_artifacts_created_at ON cleaned_artifacts(created_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_cleaned_artifacts_submitter ON cleaned_artifacts(submitter_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_access_log_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS access_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            actor_id TEXT NOT NULL,
            artifact_filename TEXT NOT NULL,
            action TEXT NOT NULL,
            timestamp TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
