//! Errors shared by the census crates
//!
//! Storage, configuration and lookup failures. Pipeline and HTTP layers wrap
//! this type in their own errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// SQLite query or connection failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem failure (root folder, config file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable config file or an unusable setting
    #[error("Configuration error: {0}")]
    Config(String),

    /// No artifact with the given id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected value, e.g. an unknown workflow status or a disallowed
    /// status change
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
