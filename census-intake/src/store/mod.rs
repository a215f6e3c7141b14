//! Artifact storage
//!
//! The pipeline, the watcher and the HTTP layer talk to storage only through
//! [`ArtifactStore`]. [`SqliteArtifactStore`] is the production backend.

pub mod sqlite;

use async_trait::async_trait;
use census_common::Result;
use uuid::Uuid;

use crate::models::{
    AccessAction, CleanedArtifact, CleanedArtifactSummary, RawArtifact, WorkflowStatus,
};

pub use sqlite::SqliteArtifactStore;

/// Persistent store for raw and cleaned artifacts plus the access log
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write a raw artifact verbatim
    async fn archive_raw(&self, artifact: &RawArtifact) -> Result<()>;

    async fn load_raw(&self, id: Uuid) -> Result<Option<RawArtifact>>;

    /// Write a cleaned artifact
    async fn store_cleaned(&self, artifact: &CleanedArtifact) -> Result<()>;

    async fn load_cleaned(&self, id: Uuid) -> Result<Option<CleanedArtifact>>;

    /// Cleaned artifact metadata, newest first, optionally for one submitter
    async fn list_cleaned(&self, submitter_id: Option<&str>) -> Result<Vec<CleanedArtifactSummary>>;

    /// Move a cleaned artifact to `status`
    ///
    /// # Errors
    /// * `Error::NotFound` - no cleaned artifact has `id`
    /// * `Error::InvalidInput` - the transition is not allowed
    async fn update_status(&self, id: Uuid, status: WorkflowStatus) -> Result<()>;

    /// Append one access log entry
    async fn record_access(
        &self,
        actor_id: &str,
        artifact_filename: &str,
        action: AccessAction,
    ) -> Result<()>;
}
