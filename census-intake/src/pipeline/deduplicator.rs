//! Batch deduplication
//!
//! Collapses records sharing an identity key within one batch. The first
//! occurrence is kept and input order is preserved.

use std::collections::HashSet;

use crate::models::{CanonicalField, CanonicalRecord};

/// Identity key used to decide whether two records are the same person
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DedupKey {
    /// Every canonical field must match
    #[default]
    FullRecord,
    /// Only the listed fields must match
    Fields(Vec<CanonicalField>),
}

impl DedupKey {
    /// Build a key from canonical column names (`["email"]`)
    ///
    /// An empty list means the full record.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        if names.is_empty() {
            return Ok(DedupKey::FullRecord);
        }

        let mut fields = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let field = CanonicalField::from_column_name(name.trim())
                .ok_or_else(|| format!("unknown dedup key field: {:?}", name))?;
            if !fields.contains(&field) {
                fields.push(field);
            }
        }

        Ok(DedupKey::Fields(fields))
    }

    /// Key values for `record`, `None` when every key field is empty
    fn key_of(&self, record: &CanonicalRecord) -> Option<Vec<String>> {
        match self {
            DedupKey::FullRecord => Some(record.values().to_vec()),
            DedupKey::Fields(fields) => {
                let values: Vec<String> = fields
                    .iter()
                    .map(|field| record.get(*field).to_string())
                    .collect();
                if values.iter().all(String::is_empty) {
                    None
                } else {
                    Some(values)
                }
            }
        }
    }
}

impl std::fmt::Display for DedupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DedupKey::FullRecord => f.write_str("full record"),
            DedupKey::Fields(fields) => {
                let names: Vec<&str> = fields.iter().map(|field| field.column_name()).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}

/// Drop records whose key was already seen earlier in the batch
pub fn dedup(records: Vec<CanonicalRecord>, key: &DedupKey) -> Vec<CanonicalRecord> {
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(records.len());

    records
        .into_iter()
        .filter(|record| match key.key_of(record) {
            Some(identity) => seen.insert(identity),
            None => true,
        })
        .collect()
}
