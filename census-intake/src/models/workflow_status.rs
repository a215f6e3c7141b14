//! Workflow status of a cleaned artifact
//!
//! Stored as the text values "0", "1", "2", the three stages of the review
//! progress indicator shown to administrators.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Review stage of a cleaned census artifact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowStatus {
    /// Freshly ingested, not yet picked up
    #[default]
    #[serde(rename = "0")]
    Pending,
    #[serde(rename = "1")]
    InProgress,
    #[serde(rename = "2")]
    Complete,
}

/// Workflow status errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("Unknown workflow status: {0:?}")]
    Unknown(String),

    #[error("Illegal workflow status transition: {from} -> {to}")]
    IllegalTransition {
        from: WorkflowStatus,
        to: WorkflowStatus,
    },
}

impl WorkflowStatus {
    pub const ALL: [WorkflowStatus; 3] = [
        WorkflowStatus::Pending,
        WorkflowStatus::InProgress,
        WorkflowStatus::Complete,
    ];

    /// Database representation
    pub fn as_stored(self) -> &'static str {
        match self {
            WorkflowStatus::Pending => "0",
            WorkflowStatus::InProgress => "1",
            WorkflowStatus::Complete => "2",
        }
    }

    /// Parse the database representation
    pub fn from_stored(value: &str) -> Result<Self, StatusError> {
        match value.trim() {
            "0" => Ok(WorkflowStatus::Pending),
            "1" => Ok(WorkflowStatus::InProgress),
            "2" => Ok(WorkflowStatus::Complete),
            other => Err(StatusError::Unknown(other.to_string())),
        }
    }

    /// States reachable from `self`
    ///
    /// Administrators may move an artifact to any stage, including back to an
    /// earlier one. Tighten this table to restrict transitions.
    pub fn allowed_next(self) -> &'static [WorkflowStatus] {
        match self {
            WorkflowStatus::Pending => &Self::ALL,
            WorkflowStatus::InProgress => &Self::ALL,
            WorkflowStatus::Complete => &Self::ALL,
        }
    }

    /// Check a status change against the transition table
    pub fn validate_transition(self, next: WorkflowStatus) -> Result<(), StatusError> {
        if self.allowed_next().contains(&next) {
            Ok(())
        } else {
            Err(StatusError::IllegalTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkflowStatus::Pending => "pending",
            WorkflowStatus::InProgress => "in_progress",
            WorkflowStatus::Complete => "complete",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_artifacts_start_pending() {
        assert_eq!(WorkflowStatus::default(), WorkflowStatus::Pending);
        assert_eq!(WorkflowStatus::default().as_stored(), "0");
    }

    #[test]
    fn test_stored_round_trip() {
        for status in WorkflowStatus::ALL {
            assert_eq!(WorkflowStatus::from_stored(status.as_stored()), Ok(status));
        }
    }

    #[test]
    fn test_unknown_values_rejected() {
        assert_eq!(
            WorkflowStatus::from_stored("3"),
            Err(StatusError::Unknown("3".to_string()))
        );
        assert!(WorkflowStatus::from_stored("done").is_err());
        assert!(WorkflowStatus::from_stored("").is_err());
    }

    #[test]
    fn test_transition_table_permits_every_known_stage() {
        for from in WorkflowStatus::ALL {
            for to in WorkflowStatus::ALL {
                assert!(from.validate_transition(to).is_ok(), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_serde_uses_stored_values() {
        assert_eq!(
            serde_json::to_string(&WorkflowStatus::InProgress).unwrap(),
            "\"1\""
        );
        let parsed: WorkflowStatus = serde_json::from_str("\"2\"").unwrap();
        assert_eq!(parsed, WorkflowStatus::Complete);
    }
}
