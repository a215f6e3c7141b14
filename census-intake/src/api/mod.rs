//! HTTP API handlers for census-intake

pub mod artifacts;
pub mod health;
pub mod upload;

pub use artifacts::artifact_routes;
pub use health::health_routes;
pub use upload::upload_routes;

/// Header naming the authenticated actor reading an artifact
pub const ACTOR_HEADER: &str = "x-actor-id";
