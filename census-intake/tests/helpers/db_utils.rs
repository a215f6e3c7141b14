//! Database Test Utilities

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use census_common::Error;
use census_intake::models::{
    AccessAction, CleanedArtifact, CleanedArtifactSummary, RawArtifact, WorkflowStatus,
};
use census_intake::store::{ArtifactStore, SqliteArtifactStore};
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

/// Create a temporary on-disk store
///
/// Returns (TempDir, store) - TempDir must be kept alive for duration of test
pub async fn create_test_store() -> Result<(TempDir, Arc<SqliteArtifactStore>)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test_census.db");
    let pool = census_common::db::init_database(&db_path).await?;
    Ok((temp_dir, Arc::new(SqliteArtifactStore::new(pool))))
}

/// Row count of a table
pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Store double that fails selected writes and delegates everything else
pub struct FaultyStore {
    pub inner: Arc<SqliteArtifactStore>,
    pub fail_raw: bool,
    pub fail_cleaned: bool,
}

impl FaultyStore {
    pub fn failing_raw(inner: Arc<SqliteArtifactStore>) -> Self {
        Self {
            inner,
            fail_raw: true,
            fail_cleaned: false,
        }
    }

    pub fn failing_cleaned(inner: Arc<SqliteArtifactStore>) -> Self {
        Self {
            inner,
            fail_raw: false,
            fail_cleaned: true,
        }
    }
}

#[async_trait]
impl ArtifactStore for FaultyStore {
    async fn archive_raw(&self, artifact: &RawArtifact) -> census_common::Result<()> {
        if self.fail_raw {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated disk failure",
            )));
        }
        self.inner.archive_raw(artifact).await
    }

    async fn load_raw(&self, id: Uuid) -> census_common::Result<Option<RawArtifact>> {
        self.inner.load_raw(id).await
    }

    async fn store_cleaned(&self, artifact: &CleanedArtifact) -> census_common::Result<()> {
        if self.fail_cleaned {
            return Err(Error::Internal("simulated store failure".to_string()));
        }
        self.inner.store_cleaned(artifact).await
    }

    async fn load_cleaned(&self, id: Uuid) -> census_common::Result<Option<CleanedArtifact>> {
        self.inner.load_cleaned(id).await
    }

    async fn list_cleaned(
        &self,
        submitter_id: Option<&str>,
    ) -> census_common::Result<Vec<CleanedArtifactSummary>> {
        self.inner.list_cleaned(submitter_id).await
    }

    async fn update_status(&self, id: Uuid, status: WorkflowStatus) -> census_common::Result<()> {
        self.inner.update_status(id, status).await
    }

    async fn record_access(
        &self,
        actor_id: &str,
        artifact_filename: &str,
        action: AccessAction,
    ) -> census_common::Result<()> {
        self.inner.record_access(actor_id, artifact_filename, action).await
    }
}
