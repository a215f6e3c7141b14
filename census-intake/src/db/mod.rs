//! Database access for census-intake
//!
//! Thin query modules over the shared SQLite pool. Schema creation lives in
//! `census_common::db`.

pub mod access_log;
pub mod cleaned_artifacts;
pub mod raw_artifacts;

use census_common::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Timestamp text as stored; fixed precision keeps lexical and time order equal
pub(crate) fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_guid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("Invalid guid '{}': {}", value, e)))
}
