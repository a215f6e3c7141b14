//! Test Helper Utilities
//!
//! Shared utilities for testing census-intake

#![allow(dead_code)]

pub mod db_utils;
pub mod fixtures;

pub use db_utils::{count_rows, create_test_store, FaultyStore};
pub use fixtures::{write_file, xlsx_from_rows, DUPLICATE_MEMBERS_CSV, MEMBERS_CSV};
