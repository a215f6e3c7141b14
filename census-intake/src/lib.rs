//! census-intake library interface
//!
//! Census spreadsheet ingestion: HTTP upload and directory-watch intake
//! feeding one pipeline that archives the raw file and stores a cleaned,
//! deduplicated xlsx artifact.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod watcher;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use census_common::events::EventBus;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

use crate::pipeline::{DedupKey, IngestPipeline};
use crate::store::ArtifactStore;

/// Largest accepted upload body
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ArtifactStore>,
    pub pipeline: IngestPipeline,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Whether a directory watcher is running alongside the API
    pub watcher_enabled: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn ArtifactStore>, dedup_key: DedupKey, event_bus: EventBus) -> Self {
        let pipeline = IngestPipeline::new(store.clone(), dedup_key).with_event_bus(event_bus);
        Self {
            store,
            pipeline,
            startup_time: Utc::now(),
            watcher_enabled: false,
        }
    }

    pub fn with_watcher_enabled(mut self, enabled: bool) -> Self {
        self.watcher_enabled = enabled;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::upload_routes())
        .merge(api::artifact_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
