//! Schema mapper
//!
//! Rewrites submitter headers onto the canonical schema. Total: unknown
//! columns are dropped and missing canonical fields come out empty.

use crate::models::{CanonicalField, CanonicalRecord};

use super::loader::Table;

/// Column binding chosen for one canonical field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    pub field: CanonicalField,
    /// Index of the input column, `None` when no header matched
    pub source_column: Option<usize>,
}

/// Lower-case a header and keep only ASCII letters and digits
///
/// `" Last-Name "`, `"LAST_NAME"` and `"last name"` all become `"lastname"`.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Canonical field a header refers to, if any
pub fn match_header(header: &str) -> Option<CanonicalField> {
    let normalized = normalize_header(header);
    if normalized.is_empty() {
        return None;
    }

    CanonicalField::ALL
        .into_iter()
        .find(|field| field.aliases().contains(&normalized.as_str()))
}

/// Bind every canonical field to at most one input column
///
/// When several input headers match the same field, the leftmost wins.
pub fn bind_columns(headers: &[String]) -> Vec<ColumnBinding> {
    let mut bindings: Vec<ColumnBinding> = CanonicalField::ALL
        .into_iter()
        .map(|field| ColumnBinding {
            field,
            source_column: None,
        })
        .collect();

    for (column, header) in headers.iter().enumerate() {
        match match_header(header) {
            Some(field) => {
                let binding = &mut bindings[field.index()];
                if binding.source_column.is_none() {
                    binding.source_column = Some(column);
                } else {
                    tracing::debug!(header = %header, field = %field, "Duplicate column for field dropped");
                }
            }
            None => tracing::debug!(header = %header, "Unmapped column dropped"),
        }
    }

    bindings
}

/// Map a loaded table onto canonical records
pub fn map_table(table: &Table) -> Vec<CanonicalRecord> {
    let bindings = bind_columns(&table.headers);

    table
        .rows
        .iter()
        .map(|row| {
            let mut record = CanonicalRecord::default();
            for binding in &bindings {
                if let Some(value) = binding.source_column.and_then(|column| row.get(column)) {
                    record.set(binding.field, value.clone());
                }
            }
            record
        })
        .collect()
}
