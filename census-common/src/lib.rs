//! # Census Common Library
//!
//! Shared code for the census intake service:
//! - Error and result types
//! - Configuration loading and root folder resolution
//! - Database initialization
//! - Ingest event bus
//! - Timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
