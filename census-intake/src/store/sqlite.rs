//! SQLite-backed artifact store

use async_trait::async_trait;
use census_common::{time, Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::ArtifactStore;
use crate::db::{access_log, cleaned_artifacts, raw_artifacts};
use crate::models::{
    AccessAction, AccessLogEntry, CleanedArtifact, CleanedArtifactSummary, RawArtifact,
    WorkflowStatus,
};

#[derive(Debug, Clone)]
pub struct SqliteArtifactStore {
    pool: SqlitePool,
}

impl SqliteArtifactStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ArtifactStore for SqliteArtifactStore {
    async fn archive_raw(&self, artifact: &RawArtifact) -> Result<()> {
        raw_artifacts::save_raw_artifact(&self.pool, artifact).await
    }

    async fn load_raw(&self, id: Uuid) -> Result<Option<RawArtifact>> {
        raw_artifacts::load_raw_artifact(&self.pool, id).await
    }

    async fn store_cleaned(&self, artifact: &CleanedArtifact) -> Result<()> {
        cleaned_artifacts::save_cleaned_artifact(&self.pool, artifact).await
    }

    async fn load_cleaned(&self, id: Uuid) -> Result<Option<CleanedArtifact>> {
        cleaned_artifacts::load_cleaned_artifact(&self.pool, id).await
    }

    async fn list_cleaned(&self, submitter_id: Option<&str>) -> Result<Vec<CleanedArtifactSummary>> {
        cleaned_artifacts::list_cleaned_artifacts(&self.pool, submitter_id).await
    }

    async fn update_status(&self, id: Uuid, status: WorkflowStatus) -> Result<()> {
        let current = cleaned_artifacts::load_workflow_status(&self.pool, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("cleaned artifact {}", id)))?;

        current
            .validate_transition(status)
            .map_err(|e| Error::InvalidInput(e.to_string()))?;

        if !cleaned_artifacts::update_workflow_status(&self.pool, id, status).await? {
            return Err(Error::NotFound(format!("cleaned artifact {}", id)));
        }

        tracing::info!(artifact_id = %id, from = %current, to = %status, "Workflow status updated");
        Ok(())
    }

    async fn record_access(
        &self,
        actor_id: &str,
        artifact_filename: &str,
        action: AccessAction,
    ) -> Result<()> {
        let entry = AccessLogEntry {
            actor_id: actor_id.to_string(),
            artifact_filename: artifact_filename.to_string(),
            action,
            timestamp: time::now(),
        };
        access_log::append_access(&self.pool, &entry).await
    }
}
